use super::bitshuffle::{
    bit_transpose, bit_untranspose, decode_chunk, default_block_size, encode_chunk, ChunkError,
    ChunkParams,
};
use super::*;
use crate::writer::ConfigurationError;
use hdf5_sys::h5z::{H5Z_FILTER_DEFLATE, H5Z_FILTER_SHUFFLE};
use proptest::prelude::*;
use std::str::FromStr;

#[test]
fn test_option_from_str() {
    assert_eq!(
        CompressionOption::from_str("gzip").unwrap(),
        CompressionOption::Gzip
    );
    assert_eq!(
        CompressionOption::from_str("GZIP_WITH_SHUFFLE").unwrap(),
        CompressionOption::GzipWithShuffle
    );
    assert_eq!(
        CompressionOption::from_str("bitshuffle_with_zstd").unwrap(),
        CompressionOption::BitshuffleWithZstd
    );
    assert!(matches!(
        CompressionOption::from_str("lzma"),
        Err(ConfigurationError::UnknownCompression(name)) if name == "lzma"
    ));
}

#[test]
fn test_option_names_round_trip() {
    for name in CompressionOption::variants() {
        let option = CompressionOption::from_str(name).unwrap();
        assert_eq!(option.to_string(), *name);
    }
}

#[test]
fn test_absent_option_means_none() {
    assert_eq!(
        CompressionOption::from_config(None).unwrap(),
        CompressionOption::None
    );
    assert_eq!(
        CompressionDescriptor::resolve_named(None, 7).unwrap(),
        CompressionDescriptor::None
    );
}

#[test]
fn test_resolve_mapping() {
    assert_eq!(
        CompressionDescriptor::resolve(CompressionOption::None, 3).unwrap(),
        CompressionDescriptor::None
    );
    assert_eq!(
        CompressionDescriptor::resolve(CompressionOption::Gzip, 4).unwrap(),
        CompressionDescriptor::Deflate {
            level: 4,
            shuffle: false
        }
    );
    assert_eq!(
        CompressionDescriptor::resolve(CompressionOption::GzipWithShuffle, 9).unwrap(),
        CompressionDescriptor::Deflate {
            level: 9,
            shuffle: true
        }
    );
    assert_eq!(
        CompressionDescriptor::resolve(CompressionOption::BitshuffleWithLz4, 5).unwrap(),
        CompressionDescriptor::Bitshuffle {
            codec: BitshuffleCodec::Lz4,
            level: 5
        }
    );
    assert_eq!(
        CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 3).unwrap(),
        CompressionDescriptor::Bitshuffle {
            codec: BitshuffleCodec::Zstd,
            level: 3
        }
    );
    // ZFP runs with plugin defaults whatever the level
    assert_eq!(
        CompressionDescriptor::resolve(CompressionOption::Zfp, -40).unwrap(),
        CompressionDescriptor::Zfp
    );
}

#[test]
fn test_resolve_is_deterministic() {
    let first = CompressionDescriptor::resolve_named(Some("gzip"), 4).unwrap();
    let second = CompressionDescriptor::resolve_named(Some("gzip"), 4).unwrap();
    assert_eq!(first, second);

    for _ in 0..2 {
        assert!(matches!(
            CompressionDescriptor::resolve_named(Some("brotli"), 4),
            Err(ConfigurationError::UnknownCompression(_))
        ));
    }
}

#[test]
fn test_level_ranges() {
    assert!(CompressionDescriptor::resolve(CompressionOption::Gzip, 0).is_ok());
    assert!(matches!(
        CompressionDescriptor::resolve(CompressionOption::Gzip, 10),
        Err(ConfigurationError::InvalidLevel { level: 10, min: 0, max: 9, .. })
    ));
    assert!(CompressionDescriptor::resolve(CompressionOption::GzipWithShuffle, -1).is_err());
    assert!(CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 0).is_err());
    assert!(CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 22).is_ok());
    assert!(CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 23).is_err());
    assert!(CompressionDescriptor::resolve(CompressionOption::BitshuffleWithLz4, -1).is_err());
    assert!(CompressionDescriptor::resolve(CompressionOption::None, -1).is_ok());
}

#[test]
fn test_filter_ids() {
    assert!(CompressionDescriptor::None.filter_ids().is_empty());
    assert_eq!(
        CompressionDescriptor::Deflate {
            level: 4,
            shuffle: true
        }
        .filter_ids(),
        vec![H5Z_FILTER_SHUFFLE, H5Z_FILTER_DEFLATE]
    );
    assert_eq!(
        CompressionDescriptor::Deflate {
            level: 4,
            shuffle: false
        }
        .filter_ids(),
        vec![H5Z_FILTER_DEFLATE]
    );
    assert_eq!(CompressionDescriptor::Zfp.filter_ids(), vec![ZFP_FILTER_ID]);
}

#[test]
fn test_bitshuffle_params() {
    let lz4 = CompressionDescriptor::resolve(CompressionOption::BitshuffleWithLz4, 5).unwrap();
    assert_eq!(lz4.filter_ids(), vec![BITSHUFFLE_FILTER_ID]);
    assert_eq!(lz4.filter_params(), vec![0, 2, 5]);

    let zstd = CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 7).unwrap();
    assert_eq!(zstd.filter_params(), vec![0, 3, 7]);

    assert!(CompressionDescriptor::Zfp.filter_params().is_empty());
}

#[test]
fn test_bitshuffle_params_select_codec_once_attached() {
    // The filter prepends version and element size to the descriptor's values
    let lz4 = CompressionDescriptor::resolve(CompressionOption::BitshuffleWithLz4, 5).unwrap();
    let mut stored = vec![0, 5, 4];
    stored.extend(lz4.filter_params());

    let params = ChunkParams::from_cd_values(&stored).unwrap();
    assert_eq!(params.codec, Some(BitshuffleCodec::Lz4));
    assert_eq!(params.level, 5);
    assert_eq!(params.elem_size, 4);
    assert_eq!(params.block_size, default_block_size(4));

    let zstd = CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 7).unwrap();
    let mut stored = vec![0, 5, 8];
    stored.extend(zstd.filter_params());
    let params = ChunkParams::from_cd_values(&stored).unwrap();
    assert_eq!(params.codec, Some(BitshuffleCodec::Zstd));
    assert_eq!(params.level, 7);
}

#[test]
fn test_bitshuffle_bad_params_rejected() {
    assert!(matches!(
        ChunkParams::from_cd_values(&[0, 5]),
        Err(ChunkError::MissingParams(2))
    ));
    assert!(matches!(
        ChunkParams::from_cd_values(&[0, 5, 0]),
        Err(ChunkError::ZeroElementSize)
    ));
    assert!(matches!(
        ChunkParams::from_cd_values(&[0, 5, 4, 12, 2]),
        Err(ChunkError::BlockSize(12))
    ));
    assert!(matches!(
        ChunkParams::from_cd_values(&[0, 5, 4, 0, 7]),
        Err(ChunkError::UnknownCodec(7))
    ));
}

#[test]
fn test_default_block_size() {
    assert_eq!(default_block_size(1), 8192);
    assert_eq!(default_block_size(4), 2048);
    assert_eq!(default_block_size(3), 2728);
    assert_eq!(default_block_size(128), 128);
}

#[test]
fn test_bit_transpose_layout() {
    // Bit 1 of element 0 lands in bit row 1
    let mut input = [0u8; 8];
    input[0] = 0b10;
    assert_eq!(bit_transpose(&input, 8, 1), vec![0, 1, 0, 0, 0, 0, 0, 0]);

    // Eight u16 ones: bit row 0 of the low byte is set for every element
    let ones: Vec<u8> = std::iter::repeat([1u8, 0u8]).take(8).flatten().collect();
    let mut expected = vec![0u8; 16];
    expected[0] = 0xFF;
    assert_eq!(bit_transpose(&ones, 8, 2), expected);
}

#[test]
fn test_bitshuffle_chunk_layout() {
    let params = ChunkParams::from_cd_values(&[0, 5, 4, 0, 2, 0]).unwrap();
    // Two full blocks, a partial block of 16 and 3 trailing elements
    let values: Vec<u32> = (0..2048 * 2 + 19).map(|i| i % 5).collect();
    let input: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

    let encoded = encode_chunk(&params, &input).unwrap();
    assert_eq!(&encoded[..8], &(input.len() as u64).to_be_bytes());
    assert_eq!(&encoded[8..12], &(2048u32 * 4).to_be_bytes());
    assert_eq!(&encoded[encoded.len() - 12..], &input[input.len() - 12..]);
    assert!(encoded.len() < input.len() / 4);

    assert_eq!(decode_chunk(&params, &encoded).unwrap(), input);
}

#[test]
fn test_bitshuffle_zstd_and_plain_chunks() {
    let input: Vec<u8> = (0..1003u64).flat_map(|v| (v * 3).to_le_bytes()).collect();

    let zstd = ChunkParams::from_cd_values(&[0, 5, 8, 0, 3, 9]).unwrap();
    let encoded = encode_chunk(&zstd, &input).unwrap();
    assert!(encoded.len() < input.len());
    assert_eq!(decode_chunk(&zstd, &encoded).unwrap(), input);

    let plain = ChunkParams::from_cd_values(&[0, 5, 8]).unwrap();
    let shuffled = encode_chunk(&plain, &input).unwrap();
    assert_eq!(shuffled.len(), input.len());
    assert_ne!(shuffled, input);
    assert_eq!(decode_chunk(&plain, &shuffled).unwrap(), input);
}

#[test]
fn test_bitshuffle_truncated_chunk() {
    let params = ChunkParams::from_cd_values(&[0, 5, 2, 0, 2]).unwrap();
    let input = vec![7u8; 512];
    let encoded = encode_chunk(&params, &input).unwrap();

    assert!(matches!(
        decode_chunk(&params, &encoded[..6]),
        Err(ChunkError::Truncated(0))
    ));
    assert!(decode_chunk(&params, &encoded[..encoded.len() - 1]).is_err());
}

#[test]
fn test_bitshuffle_filter_registered() {
    assert!(register_filters());
    assert!(filter_available(BITSHUFFLE_FILTER_ID));
    let lz4 = CompressionDescriptor::resolve(CompressionOption::BitshuffleWithLz4, 0).unwrap();
    assert!(lz4.unavailable_filters().is_empty());
}

proptest! {
    #[test]
    fn prop_bit_untranspose_inverts(
        elem_size in 1usize..9,
        groups in 1usize..6,
        seed in any::<u64>(),
    ) {
        let elements = groups * 8;
        let input: Vec<u8> = (0..elements * elem_size)
            .map(|i| (seed.rotate_left(i as u32 % 64) >> (i % 7)) as u8)
            .collect();

        let shuffled = bit_transpose(&input, elements, elem_size);
        prop_assert_eq!(bit_untranspose(&shuffled, elements, elem_size), input);
    }
}

#[test]
fn test_builtin_filters_available() {
    assert!(filter_available(H5Z_FILTER_SHUFFLE));
    assert!(filter_available(H5Z_FILTER_DEFLATE));
    assert!(CompressionDescriptor::None.unavailable_filters().is_empty());
    assert!(CompressionDescriptor::Deflate {
        level: 1,
        shuffle: true
    }
    .unavailable_filters()
    .is_empty());
}

#[test]
fn test_descriptor_serializes_with_algorithm_tag() {
    let descriptor = CompressionDescriptor::resolve(CompressionOption::BitshuffleWithZstd, 3).unwrap();
    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["algorithm"], "bitshuffle");
    assert_eq!(json["codec"], "zstd");
    assert_eq!(json["level"], 3);

    let none = serde_json::to_value(CompressionDescriptor::None).unwrap();
    assert_eq!(none["algorithm"], "none");
}

#[test]
fn test_descriptor_display() {
    assert_eq!(CompressionDescriptor::None.to_string(), "uncompressed");
    assert_eq!(
        CompressionDescriptor::Deflate {
            level: 4,
            shuffle: true
        }
        .to_string(),
        "shuffle + deflate (level 4)"
    );
}
