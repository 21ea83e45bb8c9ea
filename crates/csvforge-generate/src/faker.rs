use std::collections::BTreeMap;
use std::fmt;

use chrono::Month;
use fake::faker::address::en::{CityName, CountryName, StateName, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::{Rng, RngCore};
use tracing::debug;

use csvforge_core::Source;

use crate::errors::GenerationError;

/// Produces realistic values for one source kind.
pub trait ValueFaker: Send + Sync {
    fn source(&self) -> Source;

    fn fake(&self, rng: &mut dyn RngCore) -> String;
}

/// Explicit table of value fakers keyed by source kind.
///
/// Built by the caller and handed to the value generator; there is no
/// process-wide registry.
pub struct FakerRegistry {
    fakers: BTreeMap<Source, Box<dyn ValueFaker>>,
}

impl FakerRegistry {
    /// Registry with a faker for every source that is not generated intrinsically.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for &source in Source::ALL {
            if let Some(faker) = default_faker(source) {
                registry.fakers.insert(source, faker);
            }
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            fakers: BTreeMap::new(),
        }
    }

    /// Add a faker; fails when its source already has one.
    pub fn register(&mut self, faker: Box<dyn ValueFaker>) -> Result<(), GenerationError> {
        let source = faker.source();
        if self.fakers.contains_key(&source) {
            return Err(GenerationError::Faker(format!(
                "value faker for {source} already registered"
            )));
        }
        self.fakers.insert(source, faker);
        debug!(source = %source, "registered value faker");
        Ok(())
    }

    /// Add a faker backed by a closure.
    pub fn register_fn<F>(&mut self, source: Source, fake: F) -> Result<(), GenerationError>
    where
        F: Fn(&mut dyn RngCore) -> String + Send + Sync + 'static,
    {
        self.register(Box::new(FnFaker { source, fake }))
    }

    /// Install a faker, returning the one it displaced.
    pub fn replace(&mut self, faker: Box<dyn ValueFaker>) -> Option<Box<dyn ValueFaker>> {
        self.fakers.insert(faker.source(), faker)
    }

    pub fn contains(&self, source: Source) -> bool {
        self.fakers.contains_key(&source)
    }

    pub fn sources(&self) -> impl Iterator<Item = Source> + '_ {
        self.fakers.keys().copied()
    }

    pub fn fake(&self, source: Source, rng: &mut dyn RngCore) -> Option<String> {
        self.fakers
            .get(&source)
            .map(|faker| ValueFaker::fake(faker.as_ref(), rng))
    }
}

impl Default for FakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FakerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakerRegistry")
            .field("sources", &self.fakers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn default_faker(source: Source) -> Option<Box<dyn ValueFaker>> {
    let faker: Box<dyn ValueFaker> = match source {
        // Generated by the value generator itself.
        Source::Integer | Source::Timestamp => return None,
        Source::Uuid => Box::new(UuidFaker),
        Source::Bool => Box::new(BoolFaker),
        Source::Month => Box::new(MonthFaker),
        Source::YesNo => Box::new(ChoiceFaker {
            source,
            choices: &["Y", "N"],
        }),
        Source::BeerName => Box::new(ChoiceFaker {
            source,
            choices: BEER_NAMES,
        }),
        Source::BeerStyle => Box::new(ChoiceFaker {
            source,
            choices: BEER_STYLES,
        }),
        _ => Box::new(FakeCrateFaker { source }),
    };
    Some(faker)
}

/// Fakers backed by the `fake` crate's English corpus.
struct FakeCrateFaker {
    source: Source,
}

impl ValueFaker for FakeCrateFaker {
    fn source(&self) -> Source {
        self.source
    }

    fn fake(&self, rng: &mut dyn RngCore) -> String {
        use fake::Fake;

        match self.source {
            Source::FirstName => FirstName().fake_with_rng(rng),
            Source::LastName => LastName().fake_with_rng(rng),
            Source::Email => SafeEmail().fake_with_rng(rng),
            Source::Company => CompanyName().fake_with_rng(rng),
            Source::Phone => PhoneNumber().fake_with_rng(rng),
            Source::Street => StreetName().fake_with_rng(rng),
            Source::City => CityName().fake_with_rng(rng),
            Source::State => StateName().fake_with_rng(rng),
            Source::Zip => ZipCode().fake_with_rng(rng),
            Source::Country => CountryName().fake_with_rng(rng),
            Source::String => Word().fake_with_rng(rng),
            _ => String::new(),
        }
    }
}

struct UuidFaker;

impl ValueFaker for UuidFaker {
    fn source(&self) -> Source {
        Source::Uuid
    }

    fn fake(&self, rng: &mut dyn RngCore) -> String {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        uuid::Uuid::from_bytes(bytes).to_string()
    }
}

struct BoolFaker;

impl ValueFaker for BoolFaker {
    fn source(&self) -> Source {
        Source::Bool
    }

    fn fake(&self, rng: &mut dyn RngCore) -> String {
        rng.random_bool(0.5).to_string()
    }
}

struct MonthFaker;

impl ValueFaker for MonthFaker {
    fn source(&self) -> Source {
        Source::Month
    }

    fn fake(&self, rng: &mut dyn RngCore) -> String {
        let number: u8 = rng.random_range(1..=12);
        Month::try_from(number)
            .map(|month| month.name().to_string())
            .unwrap_or_default()
    }
}

/// Uniform pick from a fixed list.
struct ChoiceFaker {
    source: Source,
    choices: &'static [&'static str],
}

impl ValueFaker for ChoiceFaker {
    fn source(&self) -> Source {
        self.source
    }

    fn fake(&self, rng: &mut dyn RngCore) -> String {
        if self.choices.is_empty() {
            return String::new();
        }
        self.choices[rng.random_range(0..self.choices.len())].to_string()
    }
}

struct FnFaker<F> {
    source: Source,
    fake: F,
}

impl<F> ValueFaker for FnFaker<F>
where
    F: Fn(&mut dyn RngCore) -> String + Send + Sync,
{
    fn source(&self) -> Source {
        self.source
    }

    fn fake(&self, rng: &mut dyn RngCore) -> String {
        (self.fake)(rng)
    }
}

const BEER_NAMES: &[&str] = &[
    "Pliny The Elder",
    "Founders Kentucky Breakfast",
    "Trappistes Rochefort 10",
    "Westvleteren 12",
    "Hopslam Ale",
    "Stone Imperial Russian Stout",
    "St. Bernardus Abt 12",
    "Two Hearted Ale",
    "Weihenstephaner Hefeweissbier",
    "Orval Trappist Ale",
    "Duvel",
    "Celebrator Doppelbock",
    "La Fin Du Monde",
    "Old Rasputin Russian Imperial Stout",
    "Sierra Nevada Bigfoot Barleywine",
];

const BEER_STYLES: &[&str] = &[
    "Light Lager",
    "Pilsner",
    "European Amber Lager",
    "Dark Lager",
    "Bock",
    "Light Hybrid Beer",
    "Amber Hybrid Beer",
    "English Pale Ale",
    "Scottish And Irish Ale",
    "Merican Ale",
    "English Brown Ale",
    "Porter",
    "Stout",
    "India Pale Ale",
    "German Wheat And Rye Beer",
    "Belgian And French Ale",
    "Sour Ale",
    "Belgian Strong Ale",
    "Strong Ale",
    "Fruit Beer",
];
