use log::info;
use std::path::Path;

use crate::paper::Paper;
use crate::repository;

/// Astrophysics terms used when no keyword list is given.
pub const DEFAULT_ASTROPHYSICS_KEYWORDS: &[&str] = &[
    "galaxy", "galaxies", "galactic",
    "star", "stars", "stellar",
    "black hole", "blackhole", "black holes",
    "nebula",
    "supernova", "supernovae",
    "quasar", "quasars",
    "cosmic", "cosmology", "cosmological",
    "dark matter", "dark energy",
    "redshift",
    "spectroscopy", "spectroscopic",
    "exoplanet", "exoplanets",
    "planet", "planetary",
    "asteroid", "asteroids",
    "comet", "comets",
    "meteor", "meteors",
    "pulsar", "pulsars",
    "neutron star", "neutron stars",
    "white dwarf", "white dwarfs",
    "interstellar", "intergalactic",
    "magnetic field", "magnetic fields",
    "radiation", "radiative",
    "emission", "emission line",
    "absorption", "absorption line",
    "wavelength", "wavelengths",
    "infrared", "ultraviolet", "x-ray", "gamma ray",
    "telescope", "observatory",
    "hubble", "jwst", "chandra", "spitzer",
    "merger", "mergers", "merging",
    "starburst", "star formation",
    "metallicity", "metallicities",
    "evolution", "evolutionary",
    "cluster", "clusters",
    "halo", "halos",
];

/// The default keyword list as owned strings.
pub fn default_keywords() -> Vec<String> {
    DEFAULT_ASTROPHYSICS_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Plain substring search of keywords over a paper's title and abstract.
///
/// Unlike the statistics counter, single words are not held to word
/// boundaries here: "star" matches "starburst".
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    needles: Vec<String>,
    case_sensitive: bool,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S], case_sensitive: bool) -> Self {
        let keywords: Vec<String> = keywords.iter().map(|k| k.as_ref().to_string()).collect();
        let needles = if case_sensitive {
            keywords.clone()
        } else {
            keywords.iter().map(|k| k.to_lowercase()).collect()
        };

        Self {
            keywords,
            needles,
            case_sensitive,
        }
    }

    /// Matcher over [`DEFAULT_ASTROPHYSICS_KEYWORDS`], case-insensitive.
    pub fn astrophysics() -> Self {
        Self::new(DEFAULT_ASTROPHYSICS_KEYWORDS, false)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn haystack(&self, paper: &Paper) -> String {
        let text = paper.searchable_text();
        if self.case_sensitive {
            text
        } else {
            text.to_lowercase()
        }
    }

    /// True when any keyword occurs; an empty keyword list matches every paper.
    pub fn contains_any(&self, paper: &Paper) -> bool {
        if self.needles.is_empty() {
            return true;
        }
        let haystack = self.haystack(paper);
        self.needles.iter().any(|needle| haystack.contains(needle.as_str()))
    }

    /// Keywords found in the paper, in input order and original casing.
    pub fn matching(&self, paper: &Paper) -> Vec<String> {
        if self.needles.is_empty() {
            return Vec::new();
        }
        let haystack = self.haystack(paper);
        self.keywords
            .iter()
            .zip(&self.needles)
            .filter(|(_, needle)| haystack.contains(needle.as_str()))
            .map(|(keyword, _)| keyword.clone())
            .collect()
    }

    /// Papers containing at least one keyword, in their original order.
    pub fn filter<'a>(&self, papers: &'a [Paper]) -> Vec<&'a Paper> {
        papers.iter().filter(|paper| self.contains_any(paper)).collect()
    }
}

/// Whether `paper` contains any of `keywords`.
pub fn contains_any<S: AsRef<str>>(paper: &Paper, keywords: &[S], case_sensitive: bool) -> bool {
    KeywordMatcher::new(keywords, case_sensitive).contains_any(paper)
}

/// The subset of `keywords` found in `paper`.
pub fn matching<S: AsRef<str>>(paper: &Paper, keywords: &[S], case_sensitive: bool) -> Vec<String> {
    KeywordMatcher::new(keywords, case_sensitive).matching(paper)
}

fn matcher_for<S: AsRef<str>>(keywords: Option<&[S]>, case_sensitive: bool) -> KeywordMatcher {
    match keywords {
        Some(keywords) => KeywordMatcher::new(keywords, case_sensitive),
        None => KeywordMatcher::new(DEFAULT_ASTROPHYSICS_KEYWORDS, case_sensitive),
    }
}

/// Keep papers containing any keyword. `None` uses the astrophysics defaults;
/// an empty list keeps everything.
pub fn filter_papers<'a, S: AsRef<str>>(
    papers: &'a [Paper],
    keywords: Option<&[S]>,
    case_sensitive: bool,
) -> Vec<&'a Paper> {
    let filtered = matcher_for(keywords, case_sensitive).filter(papers);
    info!("{} of {} papers match the keyword filter", filtered.len(), papers.len());
    filtered
}

/// Load the given files and keep the papers matching any keyword.
pub fn filter_papers_from_files<P: AsRef<Path> + Sync, S: AsRef<str>>(
    paths: &[P],
    keywords: Option<&[S]>,
    case_sensitive: bool,
) -> Vec<Paper> {
    let matcher = matcher_for(keywords, case_sensitive);
    repository::load_from_paths(paths)
        .into_iter()
        .filter(|paper| matcher.contains_any(paper))
        .collect()
}
