//! Safetensors I/O for segmented epoch tensors.
//!
//! A subject file holds one F32 tensor `epochs` of shape
//! `[classes, channels, trials, segments, samples]` and, optionally, an F32
//! scalar `sfreq`.  [`StWriter`] writes the same layout for fixtures and the
//! `synth_epochs` tool.
use anyhow::{bail, Context, Result};
use ndarray::{Array5, ArrayView5};
use std::collections::HashMap;
use std::path::Path;

// ── Low-level safetensors parser (raw bytes → ndarray, no tensor crate). ────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len);
    let data_start = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_add(8))
        .with_context(|| format!("safetensors header length {n} overflows"))?;
    if bytes.len() < data_start {
        bail!("safetensors header length {n} exceeds file size {}", bytes.len());
    }
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..data_start])
        .context("failed to parse safetensors header")?;
    Ok((header, data_start))
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .context("tensor entry has no 'shape'")?
        .iter()
        .map(|v| v.as_u64().map(|d| d as usize).context("non-integer dimension"))
        .collect()
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f32>> {
    let dtype = entry["dtype"].as_str().unwrap_or("");
    if dtype != "F32" {
        bail!("expected F32 tensor, found dtype {dtype:?}");
    }
    let offsets = entry["data_offsets"].as_array().context("tensor entry has no 'data_offsets'")?;
    let (s, e) = match (offsets.first().and_then(|v| v.as_u64()), offsets.get(1).and_then(|v| v.as_u64())) {
        (Some(s), Some(e)) => (s, e),
        _ => bail!("malformed 'data_offsets'"),
    };
    if e < s {
        bail!("'data_offsets' end {e} precedes start {s}");
    }
    if (e - s) % 4 != 0 {
        bail!("F32 tensor byte length {} is not a multiple of 4", e - s);
    }
    let absolute = |off: u64| {
        usize::try_from(off)
            .ok()
            .and_then(|off| data_start.checked_add(off))
            .with_context(|| format!("data offset {off} overflows"))
    };
    let raw = bytes
        .get(absolute(s)?..absolute(e)?)
        .context("tensor data out of file bounds")?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

// ── Public structs ────────────────────────────────────────────────────────────

/// One subject's segmented recording.
pub struct EpochFile {
    /// `[classes, channels, trials, segments, samples]`.
    pub epochs: Array5<f32>,
    /// Sampling rate (Hz) if stored in the file.
    pub sfreq: Option<f32>,
}

impl EpochFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let (header, data_start) = parse_header(&bytes)?;

        let entry = header.get("epochs").context("missing 'epochs' key")?;
        let shape = shape_of(entry)?;
        if shape.len() != 5 {
            bail!("'epochs' must be 5-D [classes, channels, trials, segments, samples], got {shape:?}");
        }
        let data = read_f32_tensor(&bytes, data_start, entry)?;
        let epochs = Array5::from_shape_vec(
            (shape[0], shape[1], shape[2], shape[3], shape[4]),
            data,
        )
        .context("'epochs' data does not match its shape")?;

        // Sampling rate is optional.
        let sfreq = match header.get("sfreq") {
            Some(e) => read_f32_tensor(&bytes, data_start, e)?.first().copied(),
            None => None,
        };

        Ok(EpochFile { epochs, sfreq })
    }
}

/// Sampling rate shared by every subject file that stores one.
///
/// Files without a stored rate are skipped; `Ok(None)` if none stores one.
/// Rates that disagree are an error naming the first two subjects that differ.
pub fn shared_sample_rate<'a, I>(rates: I) -> Result<Option<f32>>
where
    I: IntoIterator<Item = (&'a str, Option<f32>)>,
{
    let mut first: Option<(&str, f32)> = None;
    for (subject, rate) in rates {
        let Some(rate) = rate else { continue };
        match first {
            None => first = Some((subject, rate)),
            Some((other, seen)) if seen != rate => {
                bail!("subjects {other:?} ({seen} Hz) and {subject:?} ({rate} Hz) were stored at different sampling rates");
            }
            Some(_) => {}
        }
    }
    Ok(first.map(|(_, rate)| rate))
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors writer for F32 tensors.
///
/// Usage:
/// ```rust,no_run
/// use ssvep_cca::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("sfreq", &[256.0], &[1]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, shape.to_vec()));
    }

    /// Add a 5-D epoch tensor under `name`, in standard (row-major) order.
    pub fn add_epochs(&mut self, name: &str, epochs: ArrayView5<'_, f32>) {
        let data: Vec<f32> = epochs.iter().copied().collect();
        self.add_f32(name, &data, epochs.shape());
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": "F32",
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

/// Write one subject file with `epochs` and `sfreq`.
pub fn write_epochs(path: &Path, epochs: ArrayView5<'_, f32>, sfreq: f32) -> Result<()> {
    let mut w = StWriter::new();
    w.add_epochs("epochs", epochs);
    w.add_f32("sfreq", &[sfreq], &[1]);
    w.write(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_too_small_is_error() {
        assert!(parse_header(&[1, 2, 3]).is_err());
    }

    #[test]
    fn header_length_beyond_file_is_error() {
        let mut bytes = 1000u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        assert!(parse_header(&bytes).is_err());
    }

    #[test]
    fn huge_header_length_is_error_not_overflow() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let err = parse_header(&bytes).unwrap_err();
        assert!(err.to_string().contains("header length"), "{err}");
    }

    #[test]
    fn huge_data_offsets_are_error_not_overflow() {
        let entry = serde_json::json!({
            "dtype": "F32",
            "shape": [1],
            "data_offsets": [u64::MAX - 7, u64::MAX - 3],
        });
        assert!(read_f32_tensor(&[0u8; 16], 8, &entry).is_err());
    }

    #[test]
    fn reversed_data_offsets_are_error() {
        let entry = serde_json::json!({"dtype": "F32", "shape": [1], "data_offsets": [8, 4]});
        let err = read_f32_tensor(&[0u8; 16], 0, &entry).unwrap_err();
        assert!(err.to_string().contains("precedes"), "{err}");
    }

    #[test]
    fn truncated_f32_payload_is_error() {
        let entry = serde_json::json!({"dtype": "F32", "shape": [1], "data_offsets": [0, 6]});
        let err = read_f32_tensor(&[0u8; 16], 0, &entry).unwrap_err();
        assert!(err.to_string().contains("multiple of 4"), "{err}");
    }

    #[test]
    fn corrupt_file_header_loads_as_error() {
        let path = std::env::temp_dir()
            .join(format!("ssvep_cca_{}_corrupt_header.safetensors", std::process::id()));
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        std::fs::write(&path, &bytes).unwrap();
        let result = EpochFile::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn agreeing_rates_are_shared() {
        let rates = [("s1", Some(256.0)), ("s2", None), ("s3", Some(256.0))];
        assert_eq!(shared_sample_rate(rates).unwrap(), Some(256.0));
        assert_eq!(shared_sample_rate([("s1", None)]).unwrap(), None);
    }

    #[test]
    fn disagreeing_rates_are_error() {
        let rates = [("s1", Some(256.0)), ("s2", None), ("s3", Some(250.0))];
        let err = shared_sample_rate(rates).unwrap_err();
        assert!(err.to_string().contains("\"s3\""), "{err}");
    }

    #[test]
    fn non_f32_dtype_rejected() {
        let entry = serde_json::json!({"dtype": "F64", "shape": [1], "data_offsets": [0, 8]});
        assert!(read_f32_tensor(&[0u8; 8], 0, &entry).is_err());
    }
}
