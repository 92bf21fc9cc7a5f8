//! TLS 1.0/1.1 PRF and the handshake secret derivations.
//!
//! The pre-1.2 PRF (RFC 2246 section 5) splits the secret into two halves
//! and XORs an HMAC-MD5 expansion of the first half with an HMAC-SHA1
//! expansion of the second:
//!
//! PRF(secret, label, seed) = P_MD5(S1, label + seed) XOR
//!                            P_SHA1(S2, label + seed)

use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use zeroize::Zeroize;

/// Size of the master secret (RFC 2246 section 8.1).
pub const MASTER_SECRET_LEN: usize = 48;

/// P_hash expansion (RFC 2246 section 5):
/// P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) +
///                        HMAC_hash(secret, A(2) + seed) + ...
/// where A(i) = HMAC_hash(secret, A(i-1)), A(0) = seed.
///
/// `mac` is an HMAC already keyed with the secret; output is XORed into
/// `output` so the two P_hash legs combine in place.
fn p_hash_xor<M: Mac + Clone>(mac: &M, label_and_seed: &[u8], output: &mut [u8]) {
    // A(1)
    let mut a = {
        let mut m = mac.clone();
        m.update(label_and_seed);
        m.finalize().into_bytes()
    };

    let mut offset = 0;
    while offset < output.len() {
        let mut m = mac.clone();
        m.update(&a);
        m.update(label_and_seed);
        let chunk = m.finalize().into_bytes();

        let n = usize::min(chunk.len(), output.len() - offset);
        for i in 0..n {
            output[offset + i] ^= chunk[i];
        }
        offset += n;

        // A(i+1)
        if offset < output.len() {
            let mut m = mac.clone();
            m.update(&a);
            a = m.finalize().into_bytes();
        }
    }
}

/// The TLS 1.0 PRF over both digest legs.
pub fn prf(secret: &[u8], label: &str, seed: &[u8], output: &mut [u8]) {
    let mut label_and_seed = Vec::with_capacity(label.len() + seed.len());
    label_and_seed.extend_from_slice(label.as_bytes());
    label_and_seed.extend_from_slice(seed);

    // S1 is the first half of the secret, S2 the second; with an odd
    // length the halves share the middle byte.
    let half = secret.len().div_ceil(2);
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    output.fill(0);

    let md5 = Hmac::<Md5>::new_from_slice(s1).expect("HMAC accepts any key length");
    p_hash_xor(&md5, &label_and_seed, output);

    let sha1 = Hmac::<Sha1>::new_from_slice(s2).expect("HMAC accepts any key length");
    p_hash_xor(&sha1, &label_and_seed, output);
}

/// Derive the master secret (RFC 2246 section 8.1):
/// master_secret = PRF(pre_master_secret, "master secret",
///                     client_random + server_random)[0..48]
///
/// The premaster buffer is overwritten with zeros before this returns, on
/// every path.
pub fn master_secret_from_premaster(
    premaster: &mut [u8],
    client_random: &[u8],
    server_random: &[u8],
) -> [u8; MASTER_SECRET_LEN] {
    let mut seed = Vec::with_capacity(client_random.len() + server_random.len());
    seed.extend_from_slice(client_random);
    seed.extend_from_slice(server_random);

    let mut master = [0u8; MASTER_SECRET_LEN];
    prf(premaster, "master secret", &seed, &mut master);

    premaster.zeroize();

    master
}

/// Derive the 12-byte Finished verify_data (RFC 2246 section 7.4.9):
/// verify_data = PRF(master_secret, finished_label, hash)[0..12]
/// where `transcript_hash` is MD5(handshake_messages) +
/// SHA-1(handshake_messages) for pre-1.2 versions.
pub fn calculate_verify_data(
    master_secret: &[u8],
    label: &str,
    transcript_hash: &[u8],
) -> [u8; 12] {
    let mut verify_data = [0u8; 12];
    prf(master_secret, label, transcript_hash, &mut verify_data);
    verify_data
}
