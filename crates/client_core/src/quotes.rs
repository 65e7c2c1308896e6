use rand::Rng;

/// One motivational quote shown in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

/// Shown when the configured quote list is empty.
pub const FALLBACK_QUOTE: Quote = Quote {
    text: "The art of medicine consists of amusing the patient while nature cures the disease",
    author: "Voltaire",
};

pub const MEDICAL_QUOTES: &[Quote] = &[
    Quote {
        text: "Wherever the art of medicine is loved, there is also a love of humanity",
        author: "Hippocrates",
    },
    Quote {
        text: "The good physician treats the disease; the great physician treats the patient who has the disease",
        author: "William Osler",
    },
    Quote {
        text: "Medicine is a science of uncertainty and an art of probability",
        author: "William Osler",
    },
    Quote {
        text: "Let food be thy medicine and medicine be thy food",
        author: "Hippocrates",
    },
    Quote {
        text: "To cure sometimes, to relieve often, to comfort always",
        author: "Edward Livingston Trudeau",
    },
    Quote {
        text: "Take care of your body. It's the only place you have to live",
        author: "Jim Rohn",
    },
    Quote {
        text: "Walking is man's best medicine",
        author: "Hippocrates",
    },
];

/// Picks the quote to display. Selection is uniform over the configured
/// list; an empty list always yields [`FALLBACK_QUOTE`]. The rotation timer
/// itself lives with the client so quote changes share its event channel.
#[derive(Debug, Clone, Copy)]
pub struct QuoteRotator {
    quotes: &'static [Quote],
}

impl Default for QuoteRotator {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteRotator {
    pub fn new() -> Self {
        Self {
            quotes: MEDICAL_QUOTES,
        }
    }

    pub fn with_quotes(quotes: &'static [Quote]) -> Self {
        Self { quotes }
    }

    pub fn random_quote<R: Rng>(&self, rng: &mut R) -> Quote {
        if self.quotes.is_empty() {
            return FALLBACK_QUOTE;
        }
        self.quotes[rng.gen_range(0..self.quotes.len())]
    }
}
