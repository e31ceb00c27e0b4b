//! In-process bitshuffle filter (HDF5 filter id 32008).
//!
//! Chunks use the layout of the bitshuffle HDF5 plugin, so containers written
//! here decode wherever that plugin is installed and the other way round:
//!
//! ```text
//! u64 BE   uncompressed chunk size in bytes
//! u32 BE   block size in bytes
//! blocks   u32 BE compressed size, then the compressed bit-transposed block
//! tail     the last (elements % 8) elements, copied verbatim
//! ```
//!
//! After `set_local` the filter client data reads
//! `[major, minor, element size, block size, codec, level]`.

use std::ops::Range;
use std::os::raw::{c_uint, c_void};
use std::ptr;
use std::slice;
use std::sync::OnceLock;

use hdf5_sys::h5::{herr_t, H5allocate_memory, H5free_memory};
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5p::{H5Pget_filter_by_id2, H5Pmodify_filter};
use hdf5_sys::h5t::H5Tget_size;
use hdf5_sys::h5z::{H5Z_class2_t, H5Zregister, H5Z_CLASS_T_VERS, H5Z_FLAG_REVERSE};
use log::{debug, error};
use thiserror::Error;

use super::descriptor::{BitshuffleCodec, BITSHUFFLE_FILTER_ID};

const VERSION_MAJOR: c_uint = 0;
const VERSION_MINOR: c_uint = 5;

/// Codec selector for a plain bit transposition
const CODEC_NONE: c_uint = 0;

const TARGET_BLOCK_BYTES: usize = 8192;
const MIN_BLOCK_ELEMENTS: usize = 128;
const BLOCK_MULTIPLE: usize = 8;
const HEADER_LEN: usize = 12;

/// User values accepted before `set_local` prepends its own three
const MAX_USER_PARAMS: usize = 8;

const FILTER_NAME: &[u8] = b"bitshuffle\0";

const BITSHUFFLE_CLASS: H5Z_class2_t = H5Z_class2_t {
    version: H5Z_CLASS_T_VERS as _,
    id: BITSHUFFLE_FILTER_ID,
    encoder_present: 1,
    decoder_present: 1,
    name: FILTER_NAME.as_ptr().cast(),
    can_apply: None,
    set_local: Some(set_local_bitshuffle),
    filter: Some(filter_bitshuffle),
};

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Errors raised while filtering one chunk
#[derive(Debug, Error)]
pub(crate) enum ChunkError {
    #[error("filter client data holds {0} values, at least 3 are required")]
    MissingParams(usize),

    #[error("element size is zero")]
    ZeroElementSize,

    #[error("{bytes} bytes is not a whole number of {elem_size}-byte elements")]
    PartialElement { bytes: usize, elem_size: usize },

    #[error("block size of {0} elements is not a positive multiple of 8")]
    BlockSize(usize),

    #[error("unknown codec selector {0}")]
    UnknownCodec(c_uint),

    #[error("chunk ends early at byte {0}")]
    Truncated(usize),

    #[error("block decoded to {actual} bytes, expected {expected}")]
    BlockLength { expected: usize, actual: usize },

    #[error("lz4: {0}")]
    Lz4(#[from] lz4_flex::block::DecompressError),

    #[error("zstd: {0}")]
    Zstd(#[from] std::io::Error),
}

/// Filter settings decoded from the client data of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkParams {
    pub(crate) elem_size: usize,
    /// Block size in elements
    pub(crate) block_size: usize,
    /// `None` transposes without compressing
    pub(crate) codec: Option<BitshuffleCodec>,
    pub(crate) level: i32,
}

impl ChunkParams {
    pub(crate) fn from_cd_values(values: &[c_uint]) -> Result<Self, ChunkError> {
        if values.len() < 3 {
            return Err(ChunkError::MissingParams(values.len()));
        }

        let elem_size = values[2] as usize;
        if elem_size == 0 {
            return Err(ChunkError::ZeroElementSize);
        }

        let block_size = match values.get(3).copied().unwrap_or(0) as usize {
            0 => default_block_size(elem_size),
            n if n % BLOCK_MULTIPLE == 0 => n,
            n => return Err(ChunkError::BlockSize(n)),
        };

        let codec = match values.get(4).copied().unwrap_or(CODEC_NONE) {
            CODEC_NONE => None,
            code if code == BitshuffleCodec::Lz4.filter_code() => Some(BitshuffleCodec::Lz4),
            code if code == BitshuffleCodec::Zstd.filter_code() => Some(BitshuffleCodec::Zstd),
            code => return Err(ChunkError::UnknownCodec(code)),
        };

        Ok(Self {
            elem_size,
            block_size,
            codec,
            level: values.get(5).copied().unwrap_or(0) as i32,
        })
    }

    fn elements(&self, bytes: usize) -> Result<usize, ChunkError> {
        if bytes % self.elem_size != 0 {
            return Err(ChunkError::PartialElement {
                bytes,
                elem_size: self.elem_size,
            });
        }
        Ok(bytes / self.elem_size)
    }
}

/// Block size picked when the client data leaves it at zero
pub(crate) fn default_block_size(elem_size: usize) -> usize {
    let block = TARGET_BLOCK_BYTES / elem_size / BLOCK_MULTIPLE * BLOCK_MULTIPLE;
    block.max(MIN_BLOCK_ELEMENTS)
}

/// Register the bitshuffle filter with HDF5 for this process.
///
/// Only the first call talks to HDF5; later calls return its outcome.
pub fn register() -> bool {
    *REGISTERED.get_or_init(|| {
        let _ = hdf5::library_version();
        // SAFETY: HDF5 copies the class; its name and callbacks are 'static.
        let status = hdf5::sync::sync(|| unsafe {
            H5Zregister((&BITSHUFFLE_CLASS as *const H5Z_class2_t).cast())
        });
        if status < 0 {
            error!("Failed to register the bitshuffle filter");
            false
        } else {
            debug!("Registered in-process bitshuffle filter {}", BITSHUFFLE_FILTER_ID);
            true
        }
    })
}

/// Shuffle and compress one chunk
pub(crate) fn encode_chunk(params: &ChunkParams, input: &[u8]) -> Result<Vec<u8>, ChunkError> {
    let elements = params.elements(input.len())?;
    let elem = params.elem_size;
    let (blocks, covered) = block_ranges(elements, params.block_size);

    let Some(codec) = params.codec else {
        let mut out = Vec::with_capacity(input.len());
        for block in blocks {
            let raw = &input[block.start * elem..block.end * elem];
            out.extend(bit_transpose(raw, block.len(), elem));
        }
        out.extend_from_slice(&input[covered * elem..]);
        return Ok(out);
    };

    let mut out = Vec::with_capacity(HEADER_LEN + input.len());
    out.extend_from_slice(&(input.len() as u64).to_be_bytes());
    out.extend_from_slice(&((params.block_size * elem) as u32).to_be_bytes());

    for block in blocks {
        let raw = &input[block.start * elem..block.end * elem];
        let shuffled = bit_transpose(raw, block.len(), elem);
        let compressed = compress_block(codec, params.level, &shuffled)?;
        out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        out.extend_from_slice(&compressed);
    }
    out.extend_from_slice(&input[covered * elem..]);

    Ok(out)
}

/// Decompress and unshuffle one chunk
pub(crate) fn decode_chunk(params: &ChunkParams, input: &[u8]) -> Result<Vec<u8>, ChunkError> {
    let elem = params.elem_size;

    let Some(codec) = params.codec else {
        let elements = params.elements(input.len())?;
        let (blocks, covered) = block_ranges(elements, params.block_size);
        let mut out = Vec::with_capacity(input.len());
        for block in blocks {
            let shuffled = &input[block.start * elem..block.end * elem];
            out.extend(bit_untranspose(shuffled, block.len(), elem));
        }
        out.extend_from_slice(&input[covered * elem..]);
        return Ok(out);
    };

    let total = read_u64_be(input, 0)? as usize;
    let block_size = read_u32_be(input, 8)? as usize / elem;
    if block_size == 0 || block_size % BLOCK_MULTIPLE != 0 {
        return Err(ChunkError::BlockSize(block_size));
    }

    let elements = params.elements(total)?;
    let (blocks, covered) = block_ranges(elements, block_size);
    let mut out = Vec::with_capacity(total);
    let mut pos = HEADER_LEN;

    for block in blocks {
        let expected = block.len() * elem;
        let len = read_u32_be(input, pos)? as usize;
        pos += 4;
        let compressed = input.get(pos..pos + len).ok_or(ChunkError::Truncated(pos))?;
        pos += len;

        let shuffled = decompress_block(codec, compressed, expected)?;
        if shuffled.len() != expected {
            return Err(ChunkError::BlockLength {
                expected,
                actual: shuffled.len(),
            });
        }
        out.extend(bit_untranspose(&shuffled, block.len(), elem));
    }

    let tail = (elements - covered) * elem;
    out.extend_from_slice(input.get(pos..pos + tail).ok_or(ChunkError::Truncated(pos))?);

    Ok(out)
}

/// Element ranges of the full blocks and the trailing multiple-of-8 block.
///
/// The second value is the number of elements they cover; the rest is copied raw.
fn block_ranges(elements: usize, block_size: usize) -> (Vec<Range<usize>>, usize) {
    let full = elements / block_size;
    let mut ranges: Vec<Range<usize>> = (0..full)
        .map(|i| i * block_size..(i + 1) * block_size)
        .collect();

    let mut covered = full * block_size;
    let last = (elements % block_size) / BLOCK_MULTIPLE * BLOCK_MULTIPLE;
    if last > 0 {
        ranges.push(covered..covered + last);
        covered += last;
    }

    (ranges, covered)
}

fn compress_block(codec: BitshuffleCodec, level: i32, data: &[u8]) -> Result<Vec<u8>, ChunkError> {
    match codec {
        BitshuffleCodec::Lz4 => Ok(lz4_flex::block::compress(data)),
        BitshuffleCodec::Zstd => Ok(zstd::bulk::compress(data, level)?),
    }
}

fn decompress_block(
    codec: BitshuffleCodec,
    data: &[u8],
    expected: usize,
) -> Result<Vec<u8>, ChunkError> {
    match codec {
        BitshuffleCodec::Lz4 => Ok(lz4_flex::block::decompress(data, expected)?),
        BitshuffleCodec::Zstd => Ok(zstd::bulk::decompress(data, expected)?),
    }
}

/// Bit-transpose a block of `elements` values, a multiple of 8.
///
/// Output row `b` of element byte `j` holds bit `b` of byte `j` of every
/// element in order.
pub(crate) fn bit_transpose(input: &[u8], elements: usize, elem_size: usize) -> Vec<u8> {
    let len = input.len();
    let bit_row = len / 8;

    let mut bytes = vec![0u8; len];
    transpose(input, &mut bytes, elements, elem_size, 1);

    let mut bits = vec![0u8; len];
    for (ii, group) in bytes.chunks_exact(8).enumerate() {
        let mut x = transpose_bits_8x8(u64_le(group));
        for kk in 0..8 {
            bits[kk * bit_row + ii] = x as u8;
            x >>= 8;
        }
    }

    let mut out = vec![0u8; len];
    transpose(&bits, &mut out, 8, elem_size, elements / 8);
    out
}

/// Inverse of [`bit_transpose`]
pub(crate) fn bit_untranspose(input: &[u8], elements: usize, elem_size: usize) -> Vec<u8> {
    let len = input.len();
    let bit_row = len / 8;

    let mut bits = vec![0u8; len];
    transpose(input, &mut bits, elem_size, 8, elements / 8);

    let mut bytes = vec![0u8; len];
    for ii in 0..bit_row {
        let mut x = 0u64;
        for kk in 0..8 {
            x |= u64::from(bits[kk * bit_row + ii]) << (8 * kk);
        }
        bytes[8 * ii..8 * ii + 8].copy_from_slice(&transpose_bits_8x8(x).to_le_bytes());
    }

    let mut out = vec![0u8; len];
    transpose(&bytes, &mut out, elem_size, elements, 1);
    out
}

/// `output[(c * rows + r) * width..]` receives `input[(r * cols + c) * width..]`
fn transpose(input: &[u8], output: &mut [u8], rows: usize, cols: usize, width: usize) {
    for r in 0..rows {
        for c in 0..cols {
            let src = (r * cols + c) * width;
            let dst = (c * rows + r) * width;
            output[dst..dst + width].copy_from_slice(&input[src..src + width]);
        }
    }
}

/// Transpose the 8x8 bit matrix held in a little-endian word (an involution)
fn transpose_bits_8x8(mut x: u64) -> u64 {
    let t = (x ^ (x >> 7)) & 0x00AA_00AA_00AA_00AA;
    x ^= t ^ (t << 7);
    let t = (x ^ (x >> 14)) & 0x0000_CCCC_0000_CCCC;
    x ^= t ^ (t << 14);
    let t = (x ^ (x >> 28)) & 0x0000_0000_F0F0_F0F0;
    x ^ t ^ (t << 28)
}

fn u64_le(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_le_bytes(word)
}

fn read_u64_be(input: &[u8], pos: usize) -> Result<u64, ChunkError> {
    let bytes = input.get(pos..pos + 8).ok_or(ChunkError::Truncated(pos))?;
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(word))
}

fn read_u32_be(input: &[u8], pos: usize) -> Result<u32, ChunkError> {
    let bytes = input.get(pos..pos + 4).ok_or(ChunkError::Truncated(pos))?;
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    Ok(u32::from_be_bytes(word))
}

extern "C" fn set_local_bitshuffle(dcpl_id: hid_t, type_id: hid_t, _space_id: hid_t) -> herr_t {
    let mut flags: c_uint = 0;
    let mut nelmts: usize = MAX_USER_PARAMS;
    let mut user: [c_uint; MAX_USER_PARAMS] = [0; MAX_USER_PARAMS];

    // SAFETY: the out pointers are live locals and `user` holds `nelmts` values.
    let status = unsafe {
        H5Pget_filter_by_id2(
            dcpl_id,
            BITSHUFFLE_FILTER_ID,
            &mut flags,
            &mut nelmts,
            user.as_mut_ptr(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    if status < 0 {
        return -1;
    }

    // SAFETY: takes a plain type id.
    let elem_size = unsafe { H5Tget_size(type_id) };
    let elem_size = match c_uint::try_from(elem_size) {
        Ok(size) if size > 0 => size,
        _ => return -1,
    };

    let mut values = vec![VERSION_MAJOR, VERSION_MINOR, elem_size];
    values.extend_from_slice(&user[..nelmts.min(MAX_USER_PARAMS)]);
    if let Err(e) = ChunkParams::from_cd_values(&values) {
        error!("Rejected bitshuffle parameters {:?}: {}", &values[3..], e);
        return -1;
    }

    // SAFETY: `values` outlives the call and holds `values.len()` entries.
    let status = unsafe {
        H5Pmodify_filter(dcpl_id, BITSHUFFLE_FILTER_ID, flags, values.len(), values.as_ptr())
    };
    if status < 0 {
        -1
    } else {
        1
    }
}

extern "C" fn filter_bitshuffle(
    flags: c_uint,
    cd_nelmts: usize,
    cd_values: *const c_uint,
    nbytes: usize,
    buf_size: *mut usize,
    buf: *mut *mut c_void,
) -> usize {
    if cd_values.is_null() || buf.is_null() || buf_size.is_null() {
        return 0;
    }

    // SAFETY: HDF5 hands over `cd_nelmts` client values and a chunk buffer
    // whose first `nbytes` bytes are valid.
    let (values, input) = unsafe {
        if (*buf).is_null() {
            return 0;
        }
        (
            slice::from_raw_parts(cd_values, cd_nelmts),
            slice::from_raw_parts((*buf).cast::<u8>().cast_const(), nbytes),
        )
    };

    let result = ChunkParams::from_cd_values(values).and_then(|params| {
        if flags & H5Z_FLAG_REVERSE == 0 {
            encode_chunk(&params, input)
        } else {
            decode_chunk(&params, input)
        }
    });

    match result {
        // SAFETY: `buf` and `buf_size` were checked above and belong to HDF5.
        Ok(output) => unsafe { replace_buffer(&output, buf_size, buf) },
        Err(e) => {
            error!("Bitshuffle filter failed on a {}-byte chunk: {}", nbytes, e);
            0
        }
    }
}

/// Swap the HDF5-owned chunk buffer for one holding `output`
unsafe fn replace_buffer(output: &[u8], buf_size: *mut usize, buf: *mut *mut c_void) -> usize {
    let out = H5allocate_memory(output.len(), Default::default());
    if out.is_null() {
        return 0;
    }
    ptr::copy_nonoverlapping(output.as_ptr(), out.cast::<u8>(), output.len());
    H5free_memory(*buf);
    *buf = out;
    *buf_size = output.len();
    output.len()
}
