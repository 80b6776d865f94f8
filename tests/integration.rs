use ciphercraft::comparison::{
    alice_divide, alice_encrypted_equals, alice_multiply, alice_private_equals, alice_protocol1,
    alice_protocol2, alice_top_k, bob_divide, bob_encrypted_equals, bob_multiply,
    bob_private_equals, bob_protocol1, bob_protocol2, bob_top_k, AliceKeys, AliceSession, BobKeys,
    BobSession, ComparisonError, Mode, ProtocolConfig, Variant,
};
use ciphercraft::dgk;
use ciphercraft::elgamal;
use ciphercraft::gm;
use ciphercraft::keyfile;
use ciphercraft::ntl;
use ciphercraft::paillier;
use ciphercraft::transport::InMemoryChannel;
use rug::Integer;
use std::sync::Arc;
use std::thread;

fn dgk_key(rng: &mut impl rand_core::RngCore) -> dgk::DecryptionKey {
    dgk::DecryptionKey::generate(rng, dgk::Params::new(8, 80, 256)).unwrap()
}

fn paillier_key(rng: &mut impl rand_core::RngCore) -> paillier::DecryptionKey {
    let p = ntl::generate_safe_prime(rng, 512);
    let q = ntl::generate_safe_prime(rng, 512);
    paillier::DecryptionKey::from_primes(p, q).unwrap()
}

// --- DGK cryptographic laws (spec §8 quantified invariants) ---

#[test]
fn dgk_encrypt_decrypt_roundtrip() {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk_key(&mut rng);
    let ek = dk.encryption_key();
    let u = ek.u().to_u32().unwrap();

    for m in [0u32, 1, u - 1, u / 2] {
        let (c, _nonce) = ek.encrypt_with_random(&mut rng, &m).unwrap();
        assert_eq!(dk.decrypt(&c).unwrap(), m);
    }
}

#[test]
fn dgk_additive_homomorphism() {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk_key(&mut rng);
    let ek = dk.encryption_key();
    let u = ek.u().to_u32().unwrap();

    for (m1, m2) in [(5u32, 7u32), (0, u - 1), (u - 1, u - 1)] {
        let (c1, _) = ek.encrypt_with_random(&mut rng, &m1).unwrap();
        let (c2, _) = ek.encrypt_with_random(&mut rng, &m2).unwrap();
        let sum = ek.add(&c1, &c2).unwrap();
        assert_eq!(dk.decrypt(&sum).unwrap(), (m1 + m2) % u);
    }
}

#[test]
fn dgk_scalar_multiply_law() {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk_key(&mut rng);
    let ek = dk.encryption_key();
    let u = ek.u().to_u32().unwrap();

    let m = 11u32;
    let (c, _) = ek.encrypt_with_random(&mut rng, &m).unwrap();
    for k in [2u32, 5, u - 1] {
        let scaled = ek.scalar_multiply(&Integer::from(k), &c).unwrap();
        assert_eq!(dk.decrypt(&scaled).unwrap(), (k * m) % u);
    }
}

#[test]
fn dgk_rerandomize_preserves_plaintext() {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk_key(&mut rng);
    let ek = dk.encryption_key();

    let (c, _) = ek.encrypt_with_random(&mut rng, &42).unwrap();
    let rerandomized = ek.rerandomize(&mut rng, &c).unwrap();
    assert_ne!(c, rerandomized);
    assert_eq!(dk.decrypt(&rerandomized).unwrap(), 42);
}

fn run_protocol1(mode: Mode, variant: Variant, x: u64, y: u64) -> bool {
    let mut rng = rand_dev::DevRng::new();
    let config = ProtocolConfig {
        mode,
        variant,
        dgk_params: dgk::Params::new(16, 80, 512),
        ..Default::default()
    };
    let (alice_ch, bob_ch) = InMemoryChannel::pair();

    match mode {
        Mode::Dgk => {
            let dk = dgk::DecryptionKey::generate(&mut rng, config.dgk_params).unwrap();
            let ek = Arc::new(dk.encryption_key());
            let dk = Arc::new(dk);
            let mut alice = AliceSession::new(config, AliceKeys::Dgk(ek), alice_ch).unwrap();
            let mut bob = BobSession::new(config, BobKeys::Dgk(dk), bob_ch).unwrap();
            let handle = thread::spawn(move || {
                let mut rng = rand_dev::DevRng::new();
                bob_protocol1(&mut bob, &mut rng, &Integer::from(y)).unwrap();
            });
            let result = alice_protocol1(&mut alice, &mut rng, &Integer::from(x)).unwrap();
            handle.join().unwrap();
            result
        }
        Mode::Paillier => {
            let dk = paillier_key(&mut rng);
            let ek = Arc::new(dk.encryption_key());
            let dk = Arc::new(dk);
            let mut alice = AliceSession::new(config, AliceKeys::Paillier(ek), alice_ch).unwrap();
            let mut bob = BobSession::new(config, BobKeys::Paillier(dk), bob_ch).unwrap();
            let handle = thread::spawn(move || {
                let mut rng = rand_dev::DevRng::new();
                bob_protocol1(&mut bob, &mut rng, &Integer::from(y)).unwrap();
            });
            let result = alice_protocol1(&mut alice, &mut rng, &Integer::from(x)).unwrap();
            handle.join().unwrap();
            result
        }
    }
}

#[test]
fn protocol1_original_computes_le() {
    assert!(run_protocol1(Mode::Dgk, Variant::Original, 3, 5));
    assert!(!run_protocol1(Mode::Dgk, Variant::Original, 5, 3));
    assert!(run_protocol1(Mode::Dgk, Variant::Original, 5, 5));
}

#[test]
fn protocol1_veugen_computes_le() {
    assert!(run_protocol1(Mode::Dgk, Variant::Veugen, 10, 20));
    assert!(!run_protocol1(Mode::Dgk, Variant::Veugen, 20, 10));
}

#[test]
fn protocol1_joye_computes_strict_lt() {
    assert!(run_protocol1(Mode::Dgk, Variant::Joye, 3, 5));
    assert!(!run_protocol1(Mode::Dgk, Variant::Joye, 5, 5));
}

#[test]
fn protocol1_over_paillier_bits() {
    assert!(run_protocol1(Mode::Paillier, Variant::Original, 100, 200));
    assert!(!run_protocol1(Mode::Paillier, Variant::Original, 200, 100));
}

#[test]
fn protocol1_equal_inputs_over_both_modes_and_all_variants() {
    // ORIGINAL/VEUGEN compute the inclusive `x <= y`, so equal inputs must
    // be `true`; JOYE computes the strict `x < y`, so equal inputs must be
    // `false`.
    assert!(run_protocol1(Mode::Dgk, Variant::Original, 42, 42));
    assert!(run_protocol1(Mode::Dgk, Variant::Veugen, 42, 42));
    assert!(!run_protocol1(Mode::Dgk, Variant::Joye, 42, 42));

    assert!(run_protocol1(Mode::Paillier, Variant::Original, 42, 42));
    assert!(run_protocol1(Mode::Paillier, Variant::Veugen, 42, 42));
    assert!(!run_protocol1(Mode::Paillier, Variant::Joye, 42, 42));
}

struct ProtocolHarness {
    rng: rand_dev::DevRng,
    config: ProtocolConfig,
    alice_keys: AliceKeys,
    bob_keys: BobKeys,
}

impl ProtocolHarness {
    fn dgk() -> Self {
        let mut rng = rand_dev::DevRng::new();
        let config = ProtocolConfig {
            mode: Mode::Dgk,
            variant: Variant::Original,
            dgk_params: dgk::Params::new(16, 80, 512),
            ..Default::default()
        };
        let dk = dgk::DecryptionKey::generate(&mut rng, config.dgk_params).unwrap();
        let ek = Arc::new(dk.encryption_key());
        Self {
            rng,
            config,
            alice_keys: AliceKeys::Dgk(ek),
            bob_keys: BobKeys::Dgk(Arc::new(dk)),
        }
    }

    fn paillier() -> Self {
        let mut rng = rand_dev::DevRng::new();
        let config = ProtocolConfig {
            mode: Mode::Paillier,
            variant: Variant::Original,
            ..Default::default()
        };
        let dk = paillier_key(&mut rng);
        let ek = Arc::new(dk.encryption_key());
        Self {
            rng,
            config,
            alice_keys: AliceKeys::Paillier(ek),
            bob_keys: BobKeys::Paillier(Arc::new(dk)),
        }
    }

    fn encrypt_alice(&mut self, m: &Integer) -> Integer {
        match &self.alice_keys {
            AliceKeys::Dgk(ek) => {
                ek.encrypt_with_random(&mut self.rng, &m.to_u32().unwrap())
                    .unwrap()
                    .0
            }
            AliceKeys::Paillier(ek) => ek.encrypt_with_random(&mut self.rng, m).unwrap().0,
        }
    }

    fn decrypt_bob(&self, c: &Integer) -> Integer {
        match &self.bob_keys {
            BobKeys::Dgk(dk) => Integer::from(dk.decrypt(c).unwrap()),
            BobKeys::Paillier(dk) => dk.decrypt(c).unwrap(),
        }
    }

    fn sessions(&self) -> (AliceSession<InMemoryChannel>, BobSession<InMemoryChannel>) {
        let (alice_ch, bob_ch) = InMemoryChannel::pair();
        let alice = AliceSession::new(self.config, self.alice_keys.clone(), alice_ch).unwrap();
        let bob = BobSession::new(self.config, self.bob_keys.clone(), bob_ch).unwrap();
        (alice, bob)
    }
}

#[test]
fn protocol2_over_dgk() {
    let mut h = ProtocolHarness::dgk();
    let enc_x = h.encrypt_alice(&Integer::from(7));
    let enc_y = h.encrypt_alice(&Integer::from(3));
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_protocol2(&mut bob, &mut rng).unwrap();
    });
    let ge = alice_protocol2(&mut alice, &mut h.rng, &enc_x, &enc_y).unwrap();
    handle.join().unwrap();
    assert!(ge);
}

#[test]
fn protocol2_over_paillier() {
    let mut h = ProtocolHarness::paillier();
    let enc_x = h.encrypt_alice(&Integer::from(3));
    let enc_y = h.encrypt_alice(&Integer::from(7));
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_protocol2(&mut bob, &mut rng).unwrap();
    });
    let ge = alice_protocol2(&mut alice, &mut h.rng, &enc_x, &enc_y).unwrap();
    handle.join().unwrap();
    assert!(!ge);
}

#[test]
fn outsourced_multiply_over_paillier() {
    let mut h = ProtocolHarness::paillier();
    let enc_x = h.encrypt_alice(&Integer::from(6));
    let enc_y = h.encrypt_alice(&Integer::from(7));
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_multiply(&mut bob, &mut rng).unwrap();
    });
    let enc_product = alice_multiply(&mut alice, &mut h.rng, &enc_x, &enc_y).unwrap();
    handle.join().unwrap();
    assert_eq!(h.decrypt_bob(&enc_product), 42);
}

#[test]
fn outsourced_divide_over_paillier() {
    let mut h = ProtocolHarness::paillier();
    let enc_x = h.encrypt_alice(&Integer::from(100));
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_divide(&mut bob, &mut rng).unwrap();
    });
    let enc_quotient = alice_divide(&mut alice, &mut h.rng, &enc_x, &Integer::from(7)).unwrap();
    handle.join().unwrap();
    assert_eq!(h.decrypt_bob(&enc_quotient), 14); // floor(100/7)
}

#[test]
fn top_k_ascending_over_paillier() {
    // [9,3,7,1,6,4], K=3, ascending -> smallest 3 values in order: [1,3,4]
    let mut h = ProtocolHarness::paillier();
    let values: Vec<Integer> = [9, 3, 7, 1, 6, 4].into_iter().map(Integer::from).collect();
    let enc_values: Vec<Integer> = values.iter().map(|v| h.encrypt_alice(v)).collect();
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_top_k(&mut bob, &mut rng, 6, 3, false).unwrap();
    });
    let top3 = alice_top_k(&mut alice, &mut h.rng, &enc_values, 3, true, false).unwrap();
    handle.join().unwrap();

    let plain: Vec<Integer> = top3.iter().map(|c| h.decrypt_bob(c)).collect();
    assert_eq!(plain, vec![Integer::from(1), Integer::from(3), Integer::from(4)]);
}

#[test]
fn top_k_legacy_dgk_combination_is_unsupported() {
    let mut h = ProtocolHarness::dgk();
    let enc_values: Vec<Integer> = (0..4).map(|v| h.encrypt_alice(&Integer::from(v))).collect();
    let (mut alice, _bob) = h.sessions();

    let err = alice_top_k(&mut alice, &mut h.rng, &enc_values, 2, true, true).unwrap_err();
    assert!(matches!(err, ComparisonError::UnsupportedCombination(_)));
}

#[test]
fn private_equals_over_dgk() {
    let mut h = ProtocolHarness::dgk();
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_private_equals(&mut bob, &mut rng, &Integer::from(9)).unwrap();
    });
    let equal = alice_private_equals(&mut alice, &mut h.rng, &Integer::from(9)).unwrap();
    handle.join().unwrap();
    assert!(equal);

    let (mut alice, mut bob) = h.sessions();
    let handle = thread::spawn(move || {
        let mut rng = rand_dev::DevRng::new();
        bob_private_equals(&mut bob, &mut rng, &Integer::from(9)).unwrap();
    });
    let equal = alice_private_equals(&mut alice, &mut h.rng, &Integer::from(10)).unwrap();
    handle.join().unwrap();
    assert!(!equal);
}

#[test]
fn encrypted_equals_over_paillier() {
    let mut h = ProtocolHarness::paillier();
    let enc_a = h.encrypt_alice(&Integer::from(123));
    let enc_b = h.encrypt_alice(&Integer::from(123));
    let (mut alice, mut bob) = h.sessions();

    let handle = thread::spawn(move || {
        bob_encrypted_equals(&mut bob).unwrap();
    });
    let equal = alice_encrypted_equals(&mut alice, &mut h.rng, &enc_a, &enc_b).unwrap();
    handle.join().unwrap();
    assert!(equal);

    let mut h = ProtocolHarness::paillier();
    let enc_a = h.encrypt_alice(&Integer::from(123));
    let enc_b = h.encrypt_alice(&Integer::from(124));
    let (mut alice, mut bob) = h.sessions();
    let handle = thread::spawn(move || {
        bob_encrypted_equals(&mut bob).unwrap();
    });
    let equal = alice_encrypted_equals(&mut alice, &mut h.rng, &enc_a, &enc_b).unwrap();
    handle.join().unwrap();
    assert!(!equal);
}

// --- Paillier/ElGamal/GM cryptographic laws ---

#[test]
fn paillier_homomorphic_ops() {
    let mut rng = rand_dev::DevRng::new();
    let dk = paillier_key(&mut rng);
    let ek = dk.encryption_key();

    let a = Integer::from(41);
    let b = Integer::from(-17);
    let (enc_a, _) = ek.encrypt_with_random(&mut rng, &a).unwrap();
    let (enc_b, _) = ek.encrypt_with_random(&mut rng, &b).unwrap();

    let sum = ek.oadd(&enc_a, &enc_b).unwrap();
    assert_eq!(dk.decrypt(&sum).unwrap(), Integer::from(24));

    let scaled = ek.omul(&Integer::from(3), &enc_a).unwrap();
    assert_eq!(dk.decrypt(&scaled).unwrap(), Integer::from(123));
}

#[test]
fn elgamal_multiplicative_roundtrip() {
    let mut rng = rand_dev::DevRng::new();
    let sk = elgamal::PrivateKey::generate(&mut rng, 256, false).unwrap();
    let pk = sk.public_key();

    let m = Integer::from(12345);
    let (c, _) = pk.encrypt(&mut rng, &m).unwrap();
    assert_eq!(sk.decrypt(&c, None).unwrap(), m);
}

#[test]
fn elgamal_multiplicative_homomorphism() {
    let mut rng = rand_dev::DevRng::new();
    let sk = elgamal::PrivateKey::generate(&mut rng, 256, false).unwrap();
    let pk = sk.public_key();

    let (c1, _) = pk.encrypt(&mut rng, &Integer::from(6)).unwrap();
    let (c2, _) = pk.encrypt(&mut rng, &Integer::from(7)).unwrap();
    let combined = pk.combine(&c1, &c2).unwrap();
    assert_eq!(sk.decrypt(&combined, None).unwrap(), Integer::from(42));
}

#[test]
fn elgamal_rerandomize_preserves_plaintext() {
    let mut rng = rand_dev::DevRng::new();
    let sk = elgamal::PrivateKey::generate(&mut rng, 256, false).unwrap();
    let pk = sk.public_key();

    let (c, _) = pk.encrypt(&mut rng, &Integer::from(99)).unwrap();
    let rerandomized = pk.rerandomize(&mut rng, &c).unwrap();
    assert_ne!(c, rerandomized);
    assert_eq!(sk.decrypt(&rerandomized, None).unwrap(), Integer::from(99));
}

#[test]
fn gm_bitwise_and_xor_homomorphism() {
    let mut rng = rand_dev::DevRng::new();
    let sk = gm::PrivateKey::generate(&mut rng, 256).unwrap();
    let pk = sk.public_key();

    for bit in [false, true] {
        let (c, _) = pk.encrypt_bit(&mut rng, bit).unwrap();
        assert_eq!(sk.decrypt_bit(&c).unwrap(), bit);
    }

    let (c0, _) = pk.encrypt_bit(&mut rng, false).unwrap();
    let (c1, _) = pk.encrypt_bit(&mut rng, true).unwrap();
    let xored = pk.xor(&c0, &c1).unwrap();
    assert!(sk.decrypt_bit(&xored).unwrap());
}

// --- PEM/DER key-file round trips (spec §8: "PEM round-trip: parse(serialize(k)) = k") ---

#[test]
fn dgk_keyfile_roundtrip() {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk::DecryptionKey::generate(&mut rng, dgk::Params::new(10, 80, 256)).unwrap();
    let ek = dk.encryption_key();

    let pub_pem = keyfile::dgk_public_to_pem(&ek);
    assert!(pub_pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    let loaded_ek = keyfile::dgk_public_from_pem(&pub_pem).unwrap();
    assert_eq!(loaded_ek.n(), ek.n());
    assert_eq!(loaded_ek.u(), ek.u());

    let priv_pem = keyfile::dgk_private_to_pem(&dk);
    let loaded_dk = keyfile::dgk_private_from_pem(&priv_pem).unwrap();
    let (c, _) = loaded_ek.encrypt_with_random(&mut rng, &5).unwrap();
    assert_eq!(loaded_dk.decrypt(&c).unwrap(), 5);
}

#[test]
fn paillier_keyfile_roundtrip() {
    let mut rng = rand_dev::DevRng::new();
    let dk = paillier_key(&mut rng);
    let ek = dk.encryption_key();

    let pub_pem = keyfile::paillier_public_to_pem(&ek);
    let loaded_ek = keyfile::paillier_public_from_pem(&pub_pem).unwrap();
    assert_eq!(loaded_ek.n(), ek.n());

    let priv_key = keyfile::PaillierPrivateKey::from_decryption_key(&dk);
    let priv_pem = keyfile::paillier_private_to_pem(&priv_key);
    let loaded = keyfile::paillier_private_from_pem(&priv_pem).unwrap();

    let (c, _) = ek.encrypt_with_random(&mut rng, &Integer::from(777)).unwrap();
    let plain = loaded.decrypt(&c).unwrap();
    let expected = paillier::Unsigned::from_signed(&ek, &dk.decrypt(&c).unwrap()).into_integer();
    assert_eq!(expected, plain);
}

#[test]
fn elgamal_public_keyfile_roundtrip() {
    let mut rng = rand_dev::DevRng::new();
    let sk = elgamal::PrivateKey::generate(&mut rng, 256, true).unwrap();
    let pk = sk.public_key();

    let pem = keyfile::elgamal_public_to_pem(pk);
    let loaded = keyfile::elgamal_public_from_pem(&pem).unwrap();
    assert_eq!(loaded.p(), pk.p());
    assert_eq!(loaded.g(), pk.g());
    assert_eq!(loaded.h(), pk.h());
    assert_eq!(loaded.additive(), pk.additive());
}

#[test]
fn gm_keyfile_roundtrip() {
    let mut rng = rand_dev::DevRng::new();
    let sk = gm::PrivateKey::generate(&mut rng, 256).unwrap();
    let pk = sk.public_key();

    let pub_pem = keyfile::gm_public_to_pem(pk);
    let loaded_pk = keyfile::gm_public_from_pem(&pub_pem).unwrap();
    assert_eq!(loaded_pk.n(), pk.n());
    assert_eq!(loaded_pk.y(), pk.y());

    let priv_pem = keyfile::gm_private_to_pem(&sk);
    let loaded_sk = keyfile::gm_private_from_pem(&priv_pem).unwrap();
    assert_eq!(loaded_sk.p(), sk.p());
    assert_eq!(loaded_sk.q(), sk.q());

    let (c, _) = pk.encrypt_bit(&mut rng, true).unwrap();
    assert!(loaded_sk.decrypt_bit(&c).unwrap());
}
