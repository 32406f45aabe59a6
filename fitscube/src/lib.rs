//! Minimal FITS image-cube store.
//!
//! Telemetry streams keep each capture sequence as a 3-D cube of 32-bit
//! float planes in a FITS file next to its timing file. This crate reads
//! and writes exactly that subset: a single primary HDU with `BITPIX = -32`
//! and two or three axes, big-endian data, 2880-byte blocks. Cubes
//! compressed with lz4 (a `.lz4` suffix on the conventional name) are
//! decoded whole into memory on open.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;

/// FITS files are organized in blocks of 2880 bytes.
const BLOCK_LEN: usize = 2880;
/// Each header card occupies 80 bytes.
const CARD_LEN: usize = 80;
/// Sanity cap while scanning for the `END` card.
const MAX_HEADER_BLOCKS: usize = 1000;

/// The error type for operations on FITS image cubes.
#[derive(Debug, Error)]
pub enum FitsError {
    /// The error type for the underlying I/O operations.
    #[error("io error")]
    Io(#[from] std::io::Error),
    /// Missing or malformed `SIMPLE` card.
    #[error("not a FITS file")]
    NotFits,
    /// The header ended without a required card.
    #[error("missing `{keyword}` card")]
    MissingCard { keyword: &'static str },
    /// A required card carries an unparseable value.
    #[error("bad `{keyword}` card (found `{found}`)")]
    BadCard {
        keyword: &'static str,
        found: String,
    },
    /// Only 32-bit float data is supported.
    #[error("unsupported BITPIX `{found}` (expected `-32`)")]
    UnsupportedBitpix { found: i64 },
    /// Only 2-D images and 3-D cubes are supported.
    #[error("unsupported NAXIS `{found}` (expected 2 or 3)")]
    UnsupportedNaxis { found: i64 },
    /// Plane index past the end of the cube.
    #[error("plane {index} out of bounds (cube has {planes} planes)")]
    PlaneOutOfBounds { index: usize, planes: usize },
    /// Plane buffer doesn't match the cube dimensions.
    #[error("plane length mismatch (expected {expected}, found {found})")]
    PlaneLengthMismatch { expected: usize, found: usize },
    /// The writer was finished before every plane was written.
    #[error("cube truncated (expected {expected} planes, wrote {written})")]
    Truncated { expected: usize, written: usize },
}

// Backing storage of an open cube. Compressed files are decoded into
// memory; plain files are read in place.
enum Storage {
    File(File),
    Memory(Cursor<Vec<u8>>),
}

impl Read for Storage {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Storage::File(file) => file.read(buf),
            Storage::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for Storage {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            Storage::File(file) => file.seek(pos),
            Storage::Memory(cursor) => cursor.seek(pos),
        }
    }
}

/// A readable FITS image cube.
pub struct CubeReader {
    storage: Storage,
    width: usize,
    height: usize,
    planes: usize,
    data_start: u64,
}

impl CubeReader {
    /// Open a cube, transparently decompressing `.lz4` files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FitsError> {
        let path = path.as_ref();
        let storage = match path.extension().and_then(|extension| extension.to_str()) {
            Some("lz4") => {
                let file = File::open(path)?;
                let mut decoder = lz4::Decoder::new(file)?;
                let mut contents = Vec::new();
                decoder.read_to_end(&mut contents)?;
                Storage::Memory(Cursor::new(contents))
            }
            _ => Storage::File(File::open(path)?),
        };
        Self::from_storage(storage)
    }

    fn from_storage(mut storage: Storage) -> Result<Self, FitsError> {
        let header = Header::read(&mut storage)?;
        if !header.simple {
            return Err(FitsError::NotFits);
        }
        let bitpix = header.require("BITPIX")?;
        if bitpix != -32 {
            return Err(FitsError::UnsupportedBitpix { found: bitpix });
        }
        let naxis = header.require("NAXIS")?;
        let (width, height, planes) = match naxis {
            2 => (header.require("NAXIS1")?, header.require("NAXIS2")?, 1),
            3 => (
                header.require("NAXIS1")?,
                header.require("NAXIS2")?,
                header.require("NAXIS3")?,
            ),
            found => return Err(FitsError::UnsupportedNaxis { found }),
        };
        if width <= 0 || height <= 0 || planes <= 0 {
            return Err(FitsError::BadCard {
                keyword: "NAXIS",
                found: format!("{width}x{height}x{planes}"),
            });
        }
        Ok(CubeReader {
            storage,
            width: width as usize,
            height: height as usize,
            planes: planes as usize,
            data_start: (header.blocks * BLOCK_LEN) as u64,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn planes(&self) -> usize {
        self.planes
    }

    /// Read one plane, 0-based along the slowest axis.
    pub fn read_plane(&mut self, index: usize) -> Result<Vec<f32>, FitsError> {
        if index >= self.planes {
            return Err(FitsError::PlaneOutOfBounds {
                index,
                planes: self.planes,
            });
        }
        let pixels = self.width * self.height;
        let offset = self.data_start + (index * pixels * 4) as u64;
        self.storage.seek(SeekFrom::Start(offset))?;
        let mut plane = vec![0.0f32; pixels];
        self.storage.read_f32_into::<BigEndian>(&mut plane)?;
        Ok(plane)
    }
}

// The header cards a cube reader cares about.
struct Header {
    simple: bool,
    bitpix: Option<i64>,
    naxis: Option<i64>,
    naxis1: Option<i64>,
    naxis2: Option<i64>,
    naxis3: Option<i64>,
    blocks: usize,
}

impl Header {
    fn read<R: Read>(reader: &mut R) -> Result<Self, FitsError> {
        let mut header = Header {
            simple: false,
            bitpix: None,
            naxis: None,
            naxis1: None,
            naxis2: None,
            naxis3: None,
            blocks: 0,
        };
        let mut block = [0u8; BLOCK_LEN];
        loop {
            if header.blocks == MAX_HEADER_BLOCKS {
                return Err(FitsError::MissingCard { keyword: "END" });
            }
            reader.read_exact(&mut block)?;
            header.blocks += 1;
            for card in block.chunks_exact(CARD_LEN) {
                let keyword = std::str::from_utf8(&card[..8]).unwrap_or("").trim_end();
                if keyword == "END" {
                    return Ok(header);
                }
                header.record(keyword, &card[8..])?;
            }
        }
    }

    fn record(&mut self, keyword: &str, rest: &[u8]) -> Result<(), FitsError> {
        // Fixed format: `= ` in bytes 9-10, value up to an optional comment.
        if !rest.starts_with(b"= ") {
            return Ok(());
        }
        let value = std::str::from_utf8(&rest[2..]).unwrap_or("");
        let value = match value.split_once('/') {
            Some((value, _comment)) => value,
            None => value,
        }
        .trim();
        match keyword {
            "SIMPLE" => self.simple = value == "T",
            "BITPIX" => self.bitpix = Some(parse_card_integer("BITPIX", value)?),
            "NAXIS" => self.naxis = Some(parse_card_integer("NAXIS", value)?),
            "NAXIS1" => self.naxis1 = Some(parse_card_integer("NAXIS1", value)?),
            "NAXIS2" => self.naxis2 = Some(parse_card_integer("NAXIS2", value)?),
            "NAXIS3" => self.naxis3 = Some(parse_card_integer("NAXIS3", value)?),
            _ => {}
        }
        Ok(())
    }

    fn require(&self, keyword: &'static str) -> Result<i64, FitsError> {
        let value = match keyword {
            "BITPIX" => self.bitpix,
            "NAXIS" => self.naxis,
            "NAXIS1" => self.naxis1,
            "NAXIS2" => self.naxis2,
            "NAXIS3" => self.naxis3,
            _ => None,
        };
        value.ok_or(FitsError::MissingCard { keyword })
    }
}

fn parse_card_integer(keyword: &'static str, value: &str) -> Result<i64, FitsError> {
    value.parse().map_err(|_| FitsError::BadCard {
        keyword,
        found: value.to_owned(),
    })
}

/// A writable FITS image cube.
///
/// Planes must be appended in ascending order; [`finish`](CubeWriter::finish)
/// pads the data unit to a full block and fails if any plane is missing.
pub struct CubeWriter {
    writer: BufWriter<File>,
    pixels: usize,
    planes: usize,
    written: usize,
}

impl CubeWriter {
    /// Create `path` and write the header of a `width × height × planes`
    /// cube of 32-bit floats.
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: usize,
        height: usize,
        planes: usize,
    ) -> Result<Self, FitsError> {
        let mut writer = BufWriter::new(File::create(path)?);
        let mut header = Vec::with_capacity(BLOCK_LEN);
        push_card(&mut header, "SIMPLE", "T");
        push_card(&mut header, "BITPIX", "-32");
        push_card(&mut header, "NAXIS", "3");
        push_card(&mut header, "NAXIS1", &width.to_string());
        push_card(&mut header, "NAXIS2", &height.to_string());
        push_card(&mut header, "NAXIS3", &planes.to_string());
        header.extend_from_slice(format!("{:<80}", "END").as_bytes());
        header.resize(BLOCK_LEN, b' ');
        writer.write_all(&header)?;
        Ok(CubeWriter {
            writer,
            pixels: width * height,
            planes,
            written: 0,
        })
    }

    /// Append the next plane.
    pub fn write_plane(&mut self, plane: &[f32]) -> Result<(), FitsError> {
        if plane.len() != self.pixels {
            return Err(FitsError::PlaneLengthMismatch {
                expected: self.pixels,
                found: plane.len(),
            });
        }
        if self.written == self.planes {
            return Err(FitsError::PlaneOutOfBounds {
                index: self.written,
                planes: self.planes,
            });
        }
        for &value in plane {
            self.writer.write_f32::<BigEndian>(value)?;
        }
        self.written += 1;
        Ok(())
    }

    /// Pad the data unit to a full block and flush.
    pub fn finish(mut self) -> Result<(), FitsError> {
        if self.written != self.planes {
            return Err(FitsError::Truncated {
                expected: self.planes,
                written: self.written,
            });
        }
        let data_len = self.planes * self.pixels * 4;
        let padding = (BLOCK_LEN - data_len % BLOCK_LEN) % BLOCK_LEN;
        self.writer.write_all(&vec![0u8; padding])?;
        self.writer.flush()?;
        Ok(())
    }
}

// Fixed-format card: keyword in bytes 1-8, `= ` in 9-10, value
// right-justified through byte 30.
fn push_card(header: &mut Vec<u8>, keyword: &str, value: &str) {
    header.extend_from_slice(format!("{keyword:<8}= {value:>20}{:<50}", "").as_bytes());
}
