//! Tamper detection and chunk independence.

use std::fs;

use fszk::cipher::derive::import_share_key;
use fszk::cipher::{ChunkCipher, chunk_nonce};
use fszk::config::TAG_SIZE;
use fszk::frame::Frames;
use fszk::header::{Deserializer, Header};
use fszk::secret::SecretKey;
use fszk::stream::Decryptor;
use fszk::{Credential, EncryptOptions, Error, decrypt, encrypt};
use tempfile::TempDir;

struct Sealed {
    bytes: Vec<u8>,
    header: Header,
    block_len: usize,
    key: SecretKey,
}

fn seal(data: &[u8], chunk_size: u32) -> Sealed {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.bin");
    let container = dir.path().join("in.bin.fszk");
    fs::write(&input, data).unwrap();

    let outcome = encrypt(&input, &container, &EncryptOptions::raw().chunk_size(chunk_size), &()).unwrap();
    let key = import_share_key(outcome.share_key.as_deref().unwrap()).unwrap();

    let bytes = fs::read(&container).unwrap();
    let parsed = Deserializer::deserialize(&bytes[..]).unwrap();
    let block_len = parsed.block_len() as usize;

    Sealed { bytes, header: parsed.into_header(), block_len, key }
}

fn open_stream(bytes: &[u8], key: &SecretKey) -> Result<Vec<u8>, Error> {
    let mut reader = bytes;
    let parsed = Deserializer::deserialize(&mut reader)?;
    let mut plaintext = Vec::new();
    Decryptor::new(key, parsed.header())?.run(reader, &mut plaintext, &())?;
    Ok(plaintext)
}

/// Byte offset and length of each frame.
fn frame_offsets(sealed: &Sealed) -> Vec<(usize, usize)> {
    let mut offset = sealed.block_len;
    Frames::new(sealed.header.file_size, sealed.header.chunk_size)
        .unwrap()
        .map(|spec| {
            let start = offset;
            offset += spec.frame_len();
            (start, spec.frame_len())
        })
        .collect()
}

#[test]
fn test_every_bit_flip_is_detected_at_its_chunk() {
    let data: Vec<u8> = (0u8..40).collect();
    let sealed = seal(&data, 16);

    for (chunk, (start, len)) in frame_offsets(&sealed).into_iter().enumerate() {
        for byte in start..start + len {
            for bit in [0u8, 3, 7] {
                let mut bytes = sealed.bytes.clone();
                bytes[byte] ^= 1 << bit;

                let err = open_stream(&bytes, &sealed.key).unwrap_err();
                assert!(matches!(err, Error::AuthenticationFailed { chunk: c } if c == chunk as u64), "byte {byte} bit {bit}: {err}");
            }
        }
    }
}

#[test]
fn test_earlier_chunks_survive_later_tamper() {
    let data: Vec<u8> = (0..5000u32).map(|i| (i % 253) as u8).collect();
    let sealed = seal(&data, 1000);
    let frames = frame_offsets(&sealed);

    let mut bytes = sealed.bytes.clone();
    let (start, _) = frames[3];
    bytes[start + 10] ^= 0x01;

    let cipher = ChunkCipher::new(&sealed.key, sealed.header.iv).unwrap();
    for (index, (start, len)) in frames.iter().copied().enumerate() {
        let mut frame = bytes[start..start + len].to_vec();
        let (ciphertext, tag) = frame.split_at_mut(len - TAG_SIZE);
        let result = cipher.open(index as u32, ciphertext, tag);

        if index == 3 {
            assert!(matches!(result, Err(Error::AuthenticationFailed { chunk: 3 })));
        } else {
            result.unwrap();
            assert_eq!(ciphertext, &data[index * 1000..(index + 1) * 1000]);
        }
    }
}

#[test]
fn test_partial_output_stops_before_tampered_chunk() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..3000u32).map(|i| (i % 7) as u8).collect();
    let input = dir.path().join("in.bin");
    let container = dir.path().join("in.bin.fszk");
    let output = dir.path().join("out.bin");
    fs::write(&input, &data).unwrap();

    let outcome = encrypt(&input, &container, &EncryptOptions::raw().chunk_size(1000), &()).unwrap();

    let mut bytes = fs::read(&container).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&container, &bytes).unwrap();

    let err = decrypt(&container, &output, &Credential::ShareKey(outcome.share_key.unwrap()), &()).unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed { chunk: 2 }));

    // Nothing from the failing chunk reaches the output.
    assert_eq!(fs::read(&output).unwrap(), &data[..2000]);
}

#[test]
fn test_swapped_frames_fail() {
    let data = vec![0xabu8; 64];
    let sealed = seal(&data, 32);
    let frames = frame_offsets(&sealed);

    let mut bytes = sealed.bytes.clone();
    let (a, len) = frames[0];
    let (b, _) = frames[1];
    let first = bytes[a..a + len].to_vec();
    let second = bytes[b..b + len].to_vec();
    bytes[a..a + len].copy_from_slice(&second);
    bytes[b..b + len].copy_from_slice(&first);

    assert!(matches!(open_stream(&bytes, &sealed.key), Err(Error::AuthenticationFailed { chunk: 0 })));
}

#[test]
fn test_header_tamper_changes_key_schedule() {
    let sealed = seal(&[1u8; 20], 8);

    let mut header = sealed.header.clone();
    header.iv[11] ^= 1;
    let mut bytes = fszk::header::serializer::serialize(&header).unwrap();
    bytes.extend_from_slice(&sealed.bytes[sealed.block_len..]);

    assert!(matches!(open_stream(&bytes, &sealed.key), Err(Error::AuthenticationFailed { chunk: 0 })));
}

#[test]
fn test_nonces_pairwise_distinct_near_wraparound() {
    let mut base = [7u8; 12];
    base[8..].copy_from_slice(&(u32::MAX - 2).to_be_bytes());

    let nonces: Vec<[u8; 12]> = (0..8u32).map(|i| chunk_nonce(&base, i)).collect();
    for (i, a) in nonces.iter().enumerate() {
        assert_eq!(&a[..8], &base[..8]);
        for b in &nonces[i + 1..] {
            assert_ne!(a, b);
        }
    }

    assert_eq!(&nonces[3][8..], &0u32.to_be_bytes());
}
