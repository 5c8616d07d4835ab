use chain_codec::{Error, borsh};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[test]
fn test_reference_primitive_vectors() {
    assert_eq!(borsh::to_vec(&0u8).unwrap(), [0]);
    assert_eq!(borsh::to_vec(&255u8).unwrap(), [255]);
    assert_eq!(borsh::to_vec(&12345u16).unwrap(), [0x39, 0x30]);
    assert_eq!(borsh::to_vec(&0x12345678u32).unwrap(), [0x78, 0x56, 0x34, 0x12]);
    assert_eq!(
        borsh::to_vec(&0x123456789ABCDEF0u64).unwrap(),
        [0xF0, 0xDE, 0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12]
    );
    assert_eq!(borsh::to_vec(&-12345i32).unwrap(), [0xC7, 0xCF, 0xFF, 0xFF]);
    assert_eq!(
        borsh::to_vec(&-9876543210i64).unwrap(),
        [0x16, 0xE9, 0x4F, 0xB3, 0xFD, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(borsh::to_vec(&true).unwrap(), [1]);
    assert_eq!(borsh::to_vec(&false).unwrap(), [0]);
    assert_eq!(borsh::to_vec(&Some(42u32)).unwrap(), [1, 42, 0, 0, 0]);
    assert_eq!(borsh::to_vec(&None::<u32>).unwrap(), [0]);
}

#[test]
fn test_integer_roundtrip_extremes() {
    for v in [i64::MIN, -1, 0, 1, i64::MAX] {
        assert_eq!(v, borsh::from_slice_exact::<i64>(&borsh::to_vec(&v).unwrap()).unwrap());
    }
    for v in [0u128, 1, u128::MAX] {
        let bytes = borsh::to_vec(&v).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(v, borsh::from_slice_exact::<u128>(&bytes).unwrap());
    }
}

#[test]
fn test_vec_has_four_byte_prefix() {
    let v: Vec<u16> = vec![1, 2, 3];
    let bytes = borsh::to_vec(&v).unwrap();
    assert_eq!(bytes, [3, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
    assert_eq!(v, borsh::from_slice_exact::<Vec<u16>>(&bytes).unwrap());
}

#[test]
fn test_string_and_borrowed_str() {
    let bytes = borsh::to_vec("hello").unwrap();
    assert_eq!(bytes, [5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o']);
    let s: &str = borsh::from_slice_exact(&bytes).unwrap();
    assert_eq!(s, "hello");
    assert_eq!(borsh::from_slice_exact::<String>(&bytes).unwrap(), "hello");
}

#[test]
fn test_invalid_utf8() {
    let bytes = [2, 0, 0, 0, 0xC3, 0x28];
    assert_eq!(borsh::from_slice::<String>(&bytes), Err(Error::InvalidUtf8));
}

#[test]
fn test_fixed_array_no_prefix() {
    let v = [7u8; 32];
    let bytes = borsh::to_vec(&v).unwrap();
    assert_eq!(bytes.len(), 32);
    assert_eq!(v, borsh::from_slice_exact::<[u8; 32]>(&bytes).unwrap());
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Mint {
    authority: Option<[u8; 32]>,
    supply: u64,
    decimals: u8,
    is_initialized: bool,
}

#[test]
fn test_record_fields_in_order() {
    let mint = Mint {
        authority: Some([1; 32]),
        supply: 1_000,
        decimals: 6,
        is_initialized: true,
    };
    let bytes = borsh::to_vec(&mint).unwrap();
    assert_eq!(bytes.len(), 1 + 32 + 8 + 1 + 1);
    assert_eq!(bytes[0], 1);
    assert_eq!(&bytes[33..41], 1_000u64.to_le_bytes());
    assert_eq!(bytes[41..], [6, 1]);
    assert_eq!(mint, borsh::from_slice_exact(&bytes).unwrap());
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum CounterInstruction {
    Initialize,
    Increment(u32),
    Set { value: u64, reset: bool },
}

#[test]
fn test_enum_one_byte_tag() {
    assert_eq!(borsh::to_vec(&CounterInstruction::Initialize).unwrap(), [0]);
    assert_eq!(
        borsh::to_vec(&CounterInstruction::Increment(5)).unwrap(),
        [1, 5, 0, 0, 0]
    );
    let set = CounterInstruction::Set { value: 9, reset: true };
    let bytes = borsh::to_vec(&set).unwrap();
    assert_eq!(bytes, [2, 9, 0, 0, 0, 0, 0, 0, 0, 1]);
    assert_eq!(set, borsh::from_slice_exact(&bytes).unwrap());
}

#[test]
fn test_enum_tag_out_of_range() {
    assert_eq!(
        borsh::from_slice::<CounterInstruction>(&[3]),
        Err(Error::InvalidEnumTag(3))
    );
    assert_eq!(
        borsh::from_slice::<CounterInstruction>(&[0xFF]),
        Err(Error::InvalidEnumTag(255))
    );
}

/// A variant index that only fits in a 4-byte tag.
struct WideVariant;

impl Serialize for WideVariant {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit_variant("WideVariant", 300, "Far")
    }
}

#[test]
fn test_enum_tag_too_wide_for_one_byte() {
    assert_eq!(borsh::to_vec(&WideVariant), Err(Error::InvalidEnumTag(300)));
    assert_eq!(borsh::serialized_size(&WideVariant), Err(Error::InvalidEnumTag(300)));
    assert_eq!(chain_codec::bincode::to_vec(&WideVariant).unwrap(), [44, 1, 0, 0]);
}

#[test]
fn test_nan_rejected_both_ways() {
    assert_eq!(borsh::to_vec(&f32::NAN), Err(Error::NanNotAllowed));
    assert_eq!(borsh::to_vec(&f64::NAN), Err(Error::NanNotAllowed));
    assert_eq!(borsh::serialized_size(&f64::NAN), Err(Error::NanNotAllowed));
    let nan = f64::NAN.to_le_bytes();
    assert_eq!(borsh::from_slice::<f64>(&nan), Err(Error::NanNotAllowed));
    let nan = f32::NAN.to_le_bytes();
    assert_eq!(borsh::from_slice::<f32>(&nan), Err(Error::NanNotAllowed));
}

#[test]
fn test_non_nan_specials_allowed() {
    for v in [f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0, f64::MIN_POSITIVE] {
        let decoded: f64 = borsh::from_slice_exact(&borsh::to_vec(&v).unwrap()).unwrap();
        assert_eq!(v.to_bits(), decoded.to_bits());
    }
}

#[test]
fn test_invalid_bool_and_option_tag() {
    assert_eq!(borsh::from_slice::<bool>(&[2]), Err(Error::InvalidBool(2)));
    assert_eq!(
        borsh::from_slice::<Option<u8>>(&[2, 0]),
        Err(Error::InvalidOptionTag(2))
    );
}

#[test]
fn test_truncated_integer() {
    assert_eq!(borsh::from_slice::<u32>(&[1, 2]), Err(Error::UnexpectedEndOfInput));
}

#[test]
fn test_exact_rejects_trailing_bytes() {
    assert_eq!(
        borsh::from_slice_exact::<u8>(&[42, 99]),
        Err(Error::ExtraDataAfterDeserialize(1))
    );
    assert_eq!(borsh::from_slice::<u8>(&[42, 99]).unwrap(), (42, 1));
}

#[test]
fn test_map_with_prefix() {
    let mut m = BTreeMap::new();
    m.insert(1u8, 10u16);
    m.insert(2u8, 20u16);
    let bytes = borsh::to_vec(&m).unwrap();
    assert_eq!(bytes, [2, 0, 0, 0, 1, 10, 0, 2, 20, 0]);
    assert_eq!(m, borsh::from_slice_exact::<BTreeMap<u8, u16>>(&bytes).unwrap());
}

#[test]
fn test_to_slice_buffer_too_small() {
    let mut buf = [0u8; 6];
    let err = borsh::to_slice(&(1u32, 2u32), &mut buf).unwrap_err();
    assert_eq!(
        err,
        Error::BufferTooSmall {
            offset: 4,
            requested: 4,
            capacity: 6
        }
    );
    // Only the chunk that fitted was written.
    assert_eq!(buf, [1, 0, 0, 0, 0, 0]);
}

#[test]
fn test_to_slice_presized_by_serialized_size() {
    let value = (String::from("abc"), vec![1u64, 2], Some(-1i8));
    let size = borsh::serialized_size(&value).unwrap();
    let mut buf = vec![0u8; size];
    assert_eq!(borsh::to_slice(&value, &mut buf).unwrap(), size);
    assert_eq!(buf, borsh::to_vec(&value).unwrap());
}

#[test]
fn test_unit_and_unit_struct_are_empty() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Marker;
    assert!(borsh::to_vec(&()).unwrap().is_empty());
    assert!(borsh::to_vec(&Marker).unwrap().is_empty());
    assert_eq!(borsh::from_slice_exact::<Marker>(&[]).unwrap(), Marker);
}

#[test]
fn test_byte_buf_matches_vec_u8() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Data {
        #[serde(with = "serde_bytes")]
        raw: Vec<u8>,
    }
    let data = Data { raw: vec![1, 2, 3] };
    let bytes = borsh::to_vec(&data).unwrap();
    assert_eq!(bytes, borsh::to_vec(&vec![1u8, 2, 3]).unwrap());
    assert_eq!(data, borsh::from_slice_exact(&bytes).unwrap());
}
