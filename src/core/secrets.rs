//! Random secret generation
//!
//! Two generators with different purposes:
//!
//! - [`generate_enrolment_key`] produces a memorable classroom key such as
//!   `brave-otter-0042`. It is shared with a whole class and is not meant to
//!   resist guessing.
//! - [`generate_password`] produces an account password that satisfies
//!   Moodle's default password policy.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "bright", "calm", "clever", "cosmic", "crisp", "curious", "daring",
    "eager", "fancy", "fuzzy", "gentle", "golden", "happy", "humble", "jolly", "keen", "lively",
    "lucky", "mellow", "mighty", "nimble", "noble", "plucky", "proud", "quick", "quiet", "rapid",
    "rosy", "shiny", "silver", "sleek", "snowy", "sunny", "swift", "tidy", "vivid", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "beaver", "bison", "camel", "cheetah", "crane", "dolphin", "eagle", "falcon", "ferret",
    "gecko", "heron", "ibis", "jaguar", "koala", "lemur", "lynx", "marmot", "moose", "newt",
    "ocelot", "otter", "owl", "panda", "pelican", "puffin", "quail", "rabbit", "raven", "salmon",
    "seal", "sparrow", "tapir", "tiger", "toucan", "turtle", "walrus", "whale", "wombat", "zebra",
];

const DIGITS: &[u8] = b"0123456789";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const SYMBOLS: &[u8] = b".,;:!?_-+/*@#&$";

/// Default length of generated account passwords
pub const PASSWORD_LENGTH: usize = 12;

/// Generates an `adjective-animal-NNNN` enrolment key
///
/// ```
/// use moodlecli::core::secrets::generate_enrolment_key;
///
/// let key = generate_enrolment_key(&mut rand::thread_rng());
/// assert_eq!(key.split('-').count(), 3);
/// ```
pub fn generate_enrolment_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Both word lists are non-empty constants
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("brave");
    let animal = ANIMALS.choose(rng).copied().unwrap_or("otter");
    let number: u16 = rng.gen_range(0..10_000);
    format!("{adjective}-{animal}-{number:04}")
}

/// Generates a [`PASSWORD_LENGTH`] character account password
///
/// The password holds at least one digit, one upper-case letter, one
/// lower-case letter and one symbol, in shuffled order.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    generate_password_with_length(rng, PASSWORD_LENGTH)
}

/// Generates a password of `length` characters
///
/// Lengths below four still produce one character of each class.
pub fn generate_password_with_length<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let classes = [DIGITS, UPPERCASE, LOWERCASE, SYMBOLS];
    let all: Vec<u8> = classes.concat();

    let mut password: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    while password.len() < length {
        password.push(all[rng.gen_range(0..all.len())]);
    }
    password.shuffle(rng);

    password.into_iter().map(char::from).collect()
}
