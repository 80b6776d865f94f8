use ciphercraft::comparison::{
    alice_divide, alice_encrypted_equals, alice_multiply, alice_private_equals, alice_protocol1,
    alice_protocol2, alice_top_k, bob_divide, bob_encrypted_equals, bob_multiply,
    bob_private_equals, bob_protocol1, bob_protocol2, bob_top_k, AliceKeys, AliceSession, BobKeys,
    BobSession, Mode, ProtocolConfig, Variant,
};
use ciphercraft::transport::InMemoryChannel;
use ciphercraft::{dgk, ntl, paillier};
use rug::Integer;
use std::sync::Arc;
use std::thread;

/// Safe 1536 bit prime number in hex encoding
const P: &str = "e84f454a8dd9e923fc85be8ca09278e28c5a3d9419cf118ef56912910f364c5\
                 29d999dba2837e55d413827ccf97a4b6c49addd56f079032164d487fbd22d5e\
                 a9ff0c8fdc6bce1b878a7109f33061874f310ae35ac75db3ac3fd5f49d8b85b\
                 8823f05fc288602abf6a4ef641a3766a44d7ecbceebe3bf144a582639b55658\
                 e93cc57445715ce83c0e7088ec701ded2bcbd2e91a68cb26b1aaddadf99aeef\
                 927fb82459a3805c232e36162cbea024a2fe7485b96eeb278d45016c622261b\
                 3d3aa3";
/// Safe 1536 bit prime number in hex encoding
const Q: &str = "9461f6a273f4bdf08ce0b1071253e0688d622d6b714b407200fa709d964034c\
                 1b84b97057a8dd48904a99e83f1cb4c94d6927ac6424b8028eefe6503336e03\
                 1ff0d7379932b1f6fa457d8a1e4d9436c42df8ba86ad54cc83a708cd6385d4d\
                 5cbf0c62f9f692f04e500726d5d41224e2ec88d48bd3d04c004c9a8e6ce23ee\
                 fb54995d7b4473c021f8a72c06fe3ce6488e6b1b8ad51b635a853121f4285c0\
                 c364aab061aea672cb6dd86cee08b63a5b3f1fc78f1712e1a333b2552471e5a\
                 d8403f";

fn paillier_keypair() -> (paillier::DecryptionKey, paillier::EncryptionKey) {
    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    let dk = paillier::DecryptionKey::from_primes(p, q).unwrap();
    let ek = dk.encryption_key();
    (dk, ek)
}

fn paillier_encryption(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let (dk, ek) = paillier_keypair();

    let mut group = c.benchmark_group("Paillier encrypt");

    let mut generate_inputs = || {
        let x = ek.n().clone().random_below(&mut ntl::external_rand(&mut rng)) - ek.half_n();
        let nonce = ntl::sample_in_mult_group(&mut rng, ek.n());
        (x, nonce)
    };

    group.bench_function("Regular Encrypt", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |(x, nonce)| ek.encrypt_with(&x, &nonce).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
    group.bench_function("Encrypt with known factorization", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |(x, nonce)| dk.encrypt_with(&x, &nonce).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    let p = convert_integer_to_unknown_order(&p);
    let q = convert_integer_to_unknown_order(&q);
    let libdk = libpaillier::DecryptionKey::with_primes_unchecked(&p, &q).unwrap();
    let libek: libpaillier::EncryptionKey = (&libdk).into();

    let mut generate_inputs = || {
        let (x, nonce) = (generate_inputs)();
        (
            convert_integer_to_unknown_order(&x).to_bytes(),
            convert_integer_to_unknown_order(&nonce),
        )
    };

    group.bench_function("Encrypt libpaillier", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |(x, nonce)| libek.encrypt(x, Some(nonce)).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn paillier_decryption(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let (dk, ek) = paillier_keypair();

    let mut group = c.benchmark_group("Paillier decrypt");

    let mut generate_inputs = || ntl::sample_in_mult_group(&mut rng, ek.nn());

    group.bench_function("Decrypt with CRT", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |enc_x| dk.decrypt(&enc_x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    let p = convert_integer_to_unknown_order(&p);
    let q = convert_integer_to_unknown_order(&q);
    let libdk = libpaillier::DecryptionKey::with_primes_unchecked(&p, &q).unwrap();

    let mut generate_inputs = || {
        let enc_x = (generate_inputs)();
        convert_integer_to_unknown_order(&enc_x)
    };

    group.bench_function("Decrypt libpaillier", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |enc_x| libdk.decrypt(&enc_x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn paillier_omul(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let (dk, ek) = paillier_keypair();

    let mut group = c.benchmark_group("Paillier omul");

    let mut generate_inputs = || {
        let scalar = ek
            .nn()
            .random_below_ref(&mut ntl::external_rand(&mut rng))
            .into();
        let enc_x = ntl::sample_in_mult_group(&mut rng, ek.nn());
        (scalar, enc_x)
    };

    group.bench_function("with CRT", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |(scalar, enc_x): (Integer, Integer)| dk.omul(&scalar, &enc_x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
    group.bench_function("without CRT", |b| {
        b.iter_batched(
            &mut generate_inputs,
            |(scalar, enc_x)| ek.omul(&scalar, &enc_x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn dgk_ops(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk::DecryptionKey::generate(&mut rng, dgk::Params::new(16, 80, 1024)).unwrap();
    let ek = dk.encryption_key();
    let u = ek.u().to_u32().unwrap();

    let mut group = c.benchmark_group("DGK");

    let mut generate_input = || {
        let m = rand_core::RngCore::next_u32(&mut rng) % u;
        let nonce = ntl::random_bits(&mut rng, ek.n().significant_bits());
        (m, nonce)
    };

    group.bench_function("Encrypt", |b| {
        b.iter_batched(
            &mut generate_input,
            |(m, nonce)| ek.encrypt_with(&m, &nonce).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    let mut generate_ciphertext = || {
        let (m, nonce) = (generate_input)();
        ek.encrypt_with(&m, &nonce).unwrap()
    };

    group.bench_function("Decrypt", |b| {
        b.iter_batched(
            &mut generate_ciphertext,
            |c| dk.decrypt(&c).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
    group.bench_function("Homomorphic add", |b| {
        b.iter_batched(
            || ((generate_ciphertext)(), (generate_ciphertext)()),
            |(c1, c2)| ek.add(&c1, &c2).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

/// Old implementation of safe primes
pub fn naive_safe_prime(rng: &mut impl rand_core::RngCore, bits: u32) -> Integer {
    use rug::{integer::IsPrime, Assign};
    let mut rng = ntl::external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(Integer::random_bits(bits - 1, &mut rng));
        x.set_bit(bits - 2, true);
        x.next_prime_mut();
        x <<= 1;
        x += 1;

        if let IsPrime::Yes | IsPrime::Probably = x.is_probably_prime(25) {
            return x;
        }
    }
}

fn safe_primes(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();

    let mut group = c.benchmark_group("Safe primes");
    for (bits, sample_size) in [(512, 200), (1024, 10), (1536, 10)] {
        let id = |s| format!("{}/{}", bits, s);
        group.sample_size(sample_size);

        group.bench_function(id("Original"), |b| {
            b.iter(|| naive_safe_prime(&mut rng.clone(), bits))
        });
        group.bench_function(id("Current"), |b| {
            b.iter(|| ntl::generate_safe_prime(&mut rng.clone(), bits))
        });
    }
}

fn rng_conversion(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();

    let mut group = c.benchmark_group("PRNG conversion");

    group.bench_function("into GMP", |b| {
        b.iter(|| {
            let mut gmp_rng = ntl::external_rand(std::hint::black_box(&mut rng));
            let dyn_rng: &mut dyn rug::rand::MutRandState = &mut gmp_rng;
            let _ = std::hint::black_box(dyn_rng);
        })
    });
}

fn protocol1(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk::DecryptionKey::generate(&mut rng, dgk::Params::new(16, 80, 1024)).unwrap();
    let ek = Arc::new(dk.encryption_key());
    let dk = Arc::new(dk);
    let config = ProtocolConfig {
        mode: Mode::Dgk,
        variant: Variant::Veugen,
        dgk_params: dgk::Params::new(16, 80, 1024),
        ..Default::default()
    };

    let mut group = c.benchmark_group("Comparison protocols");
    group.sample_size(20);

    group.bench_function("Protocol 1 (DGK, Veugen)", |b| {
        b.iter_batched(
            || {
                let (alice_ch, bob_ch) = InMemoryChannel::pair();
                let alice =
                    AliceSession::new(config, AliceKeys::Dgk(ek.clone()), alice_ch).unwrap();
                let bob = BobSession::new(config, BobKeys::Dgk(dk.clone()), bob_ch).unwrap();
                (alice, bob)
            },
            |(mut alice, mut bob)| {
                let handle = thread::spawn(move || {
                    let mut rng = rand_dev::DevRng::new();
                    bob_protocol1(&mut bob, &mut rng, &Integer::from(123)).unwrap();
                });
                alice_protocol1(&mut alice, &mut rng, &Integer::from(100)).unwrap();
                handle.join().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn protocol2(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    let dk = paillier::DecryptionKey::from_primes(p, q).unwrap();
    let ek = Arc::new(dk.encryption_key());
    let dk = Arc::new(dk);
    let config = ProtocolConfig {
        mode: Mode::Paillier,
        variant: Variant::Original,
        ..Default::default()
    };

    let (enc_x, _) = ek.encrypt_with_random(&mut rng, &Integer::from(100)).unwrap();
    let (enc_y, _) = ek.encrypt_with_random(&mut rng, &Integer::from(200)).unwrap();

    let mut group = c.benchmark_group("Comparison protocols");
    group.sample_size(20);

    group.bench_function("Protocol 2 (Paillier)", |b| {
        b.iter_batched(
            || {
                let (alice_ch, bob_ch) = InMemoryChannel::pair();
                let alice = AliceSession::new(config, AliceKeys::Paillier(ek.clone()), alice_ch)
                    .unwrap();
                let bob =
                    BobSession::new(config, BobKeys::Paillier(dk.clone()), bob_ch).unwrap();
                (alice, bob)
            },
            |(mut alice, mut bob)| {
                let handle = thread::spawn(move || {
                    let mut rng = rand_dev::DevRng::new();
                    bob_protocol2(&mut bob, &mut rng).unwrap();
                });
                alice_protocol2(&mut alice, &mut rng, &enc_x, &enc_y).unwrap();
                handle.join().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn outsourced(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    let dk = paillier::DecryptionKey::from_primes(p, q).unwrap();
    let ek = Arc::new(dk.encryption_key());
    let dk = Arc::new(dk);
    let config = ProtocolConfig {
        mode: Mode::Paillier,
        variant: Variant::Original,
        ..Default::default()
    };

    let (enc_x, _) = ek.encrypt_with_random(&mut rng, &Integer::from(6)).unwrap();
    let (enc_y, _) = ek.encrypt_with_random(&mut rng, &Integer::from(7)).unwrap();

    let mut group = c.benchmark_group("Comparison protocols");
    group.sample_size(20);

    group.bench_function("Outsourced multiply (Paillier)", |b| {
        b.iter_batched(
            || {
                let (alice_ch, bob_ch) = InMemoryChannel::pair();
                let alice = AliceSession::new(config, AliceKeys::Paillier(ek.clone()), alice_ch)
                    .unwrap();
                let bob =
                    BobSession::new(config, BobKeys::Paillier(dk.clone()), bob_ch).unwrap();
                (alice, bob)
            },
            |(mut alice, mut bob)| {
                let handle = thread::spawn(move || {
                    let mut rng = rand_dev::DevRng::new();
                    bob_multiply(&mut bob, &mut rng).unwrap();
                });
                alice_multiply(&mut alice, &mut rng, &enc_x, &enc_y).unwrap();
                handle.join().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("Outsourced divide (Paillier)", |b| {
        b.iter_batched(
            || {
                let (alice_ch, bob_ch) = InMemoryChannel::pair();
                let alice = AliceSession::new(config, AliceKeys::Paillier(ek.clone()), alice_ch)
                    .unwrap();
                let bob =
                    BobSession::new(config, BobKeys::Paillier(dk.clone()), bob_ch).unwrap();
                (alice, bob)
            },
            |(mut alice, mut bob)| {
                let handle = thread::spawn(move || {
                    let mut rng = rand_dev::DevRng::new();
                    bob_divide(&mut bob, &mut rng).unwrap();
                });
                alice_divide(&mut alice, &mut rng, &enc_x, &Integer::from(3)).unwrap();
                handle.join().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn top_k(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    let dk = paillier::DecryptionKey::from_primes(p, q).unwrap();
    let ek = Arc::new(dk.encryption_key());
    let dk = Arc::new(dk);
    let config = ProtocolConfig {
        mode: Mode::Paillier,
        variant: Variant::Original,
        ..Default::default()
    };

    let values: Vec<Integer> = [9, 3, 7, 1, 6, 4].into_iter().map(Integer::from).collect();
    let enc_values: Vec<Integer> = values
        .iter()
        .map(|v| ek.encrypt_with_random(&mut rng, v).unwrap().0)
        .collect();

    let mut group = c.benchmark_group("Comparison protocols");
    group.sample_size(10);

    group.bench_function("Top-3 of 6 (Paillier)", |b| {
        b.iter_batched(
            || {
                let (alice_ch, bob_ch) = InMemoryChannel::pair();
                let alice = AliceSession::new(config, AliceKeys::Paillier(ek.clone()), alice_ch)
                    .unwrap();
                let bob =
                    BobSession::new(config, BobKeys::Paillier(dk.clone()), bob_ch).unwrap();
                (alice, bob)
            },
            |(mut alice, mut bob)| {
                let handle = thread::spawn(move || {
                    let mut rng = rand_dev::DevRng::new();
                    bob_top_k(&mut bob, &mut rng, 6, 3, false).unwrap();
                });
                alice_top_k(&mut alice, &mut rng, &enc_values, 3, true, false).unwrap();
                handle.join().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn equality(c: &mut criterion::Criterion) {
    let mut rng = rand_dev::DevRng::new();
    let dk = dgk::DecryptionKey::generate(&mut rng, dgk::Params::new(16, 80, 1024)).unwrap();
    let ek = Arc::new(dk.encryption_key());
    let dk = Arc::new(dk);
    let config = ProtocolConfig {
        mode: Mode::Dgk,
        variant: Variant::Original,
        dgk_params: dgk::Params::new(16, 80, 1024),
        ..Default::default()
    };

    let mut group = c.benchmark_group("Comparison protocols");
    group.sample_size(20);

    group.bench_function("Private equals (DGK)", |b| {
        b.iter_batched(
            || {
                let (alice_ch, bob_ch) = InMemoryChannel::pair();
                let alice =
                    AliceSession::new(config, AliceKeys::Dgk(ek.clone()), alice_ch).unwrap();
                let bob = BobSession::new(config, BobKeys::Dgk(dk.clone()), bob_ch).unwrap();
                (alice, bob)
            },
            |(mut alice, mut bob)| {
                let handle = thread::spawn(move || {
                    let mut rng = rand_dev::DevRng::new();
                    bob_private_equals(&mut bob, &mut rng, &Integer::from(42)).unwrap();
                });
                alice_private_equals(&mut alice, &mut rng, &Integer::from(42)).unwrap();
                handle.join().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion::criterion_group!(
    benches,
    paillier_encryption,
    paillier_decryption,
    paillier_omul,
    dgk_ops,
    safe_primes,
    rng_conversion,
    protocol1,
    protocol2,
    outsourced,
    top_k,
    equality,
);
criterion::criterion_main!(benches);

fn convert_integer_to_unknown_order(x: &Integer) -> libpaillier::unknown_order::BigNumber {
    let bytes = x.to_digits::<u8>(rug::integer::Order::Msf);
    libpaillier::unknown_order::BigNumber::from_slice(&bytes)
}
