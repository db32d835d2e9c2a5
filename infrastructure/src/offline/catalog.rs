//! Canned content for the offline generator.

use parley_domain::{ArticleCard, ErrorInfo};
use rand::Rng;
use rand::seq::SliceRandom;

/// Simulated failures: (code, message)
const ERRORS: &[(&str, &str)] = &[
    (
        "NETWORK_TIMEOUT",
        "The network request timed out; check your connection and retry",
    ),
    ("SERVER_ERROR", "The server hit an internal error; retry later"),
    ("RATE_LIMIT", "Too many requests; wait a moment and retry"),
    (
        "SERVICE_UNAVAILABLE",
        "The service is temporarily unavailable; retry later",
    ),
];

const REPLIES: &[&str] = &[
    "Hi! I'm an offline assistant, happy to help.",
    "Good question. Let's break it down:\n\n\
     ## Analysis\n\n\
     1. **Root cause**: unclear requirements\n\
     2. **Factors**: tooling choices and team habits\n\
     3. **Plan**: ship it in stages\n\n\
     ```rust\n\
     fn analyze(requirements: &[Requirement]) -> Analysis {\n    \
         Analysis::new(root_cause(requirements), factors(), plan())\n\
     }\n\
     ```\n\n\
     Hope that helps!",
    "A few angles worth considering:\n\n\
     - **Performance**: avoid needless allocations\n\
     - **Readability**: name things after what they do\n\
     - **Maintainability**: keep modules small and focused\n\n\
     See [The Rust Book](https://doc.rust-lang.org/book/) for more.",
    "Here is how I would approach it:\n\n\
     1. **Confirm requirements**: agree on the goal\n\
     2. **Pick the stack**: choose tools the team knows\n\
     3. **Design**: leave room to grow\n\
     4. **Build**: one module at a time\n\
     5. **Ship**: test, then deploy\n\n\
     ```bash\n\
     cargo new my-project\n\
     cd my-project\n\
     cargo run\n\
     ```",
];

struct CardEntry {
    keywords: &'static [&'static str],
    title: &'static str,
    description: &'static str,
    image: &'static str,
    url: &'static str,
}

const CARDS: &[CardEntry] = &[
    CardEntry {
        keywords: &["vue", "frontend framework"],
        title: "Vue 3 Composition API in depth",
        description: "Core concepts and best practices of the Vue 3 Composition API.",
        image: "https://images.unsplash.com/photo-1555066931-4365d14bab8c?w=400&h=200&fit=crop",
        url: "https://vuejs.org/guide/extras/composition-api-faq.html",
    },
    CardEntry {
        keywords: &["typescript", "type"],
        title: "TypeScript with Vue 3",
        description: "Getting the most out of type safety in a Vue 3 project.",
        image: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=200&fit=crop",
        url: "https://vuejs.org/guide/typescript/overview.html",
    },
    CardEntry {
        keywords: &["state management", "pinia"],
        title: "Front-end state management done right",
        description: "Understanding Pinia and building maintainable application state.",
        image: "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=400&h=200&fit=crop",
        url: "https://pinia.vuejs.org/",
    },
    CardEntry {
        keywords: &["css", "layout", "style"],
        title: "Modern CSS layout",
        description: "Flexbox, Grid and other techniques for responsive design.",
        image: "https://images.unsplash.com/photo-1505685296765-3a2736de412f?w=400&h=200&fit=crop",
        url: "https://developer.mozilla.org/en-US/docs/Learn/CSS/CSS_layout",
    },
];

impl CardEntry {
    fn to_card(&self) -> ArticleCard {
        ArticleCard {
            title: self.title.to_string(),
            description: self.description.to_string(),
            image: Some(self.image.to_string()),
            url: self.url.to_string(),
        }
    }
}

pub fn random_error<R: Rng + ?Sized>(rng: &mut R) -> ErrorInfo {
    let (code, message) = ERRORS[rng.gen_range(0..ERRORS.len())];
    ErrorInfo::new(message).with_code(code).with_retryable(true)
}

/// A canned reply quoting the user's prompt
pub fn random_reply<R: Rng + ?Sized>(rng: &mut R, prompt: &str) -> String {
    let body = REPLIES.choose(rng).copied().unwrap_or_default();
    format!("Here is my reply to \"{prompt}\": {body}")
}

/// The first card whose keywords occur in `prompt` (case-insensitive)
pub fn relevant_card(prompt: &str) -> Option<ArticleCard> {
    let prompt = prompt.to_lowercase();
    CARDS
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| prompt.contains(k)))
        .map(CardEntry::to_card)
}

pub fn random_card<R: Rng + ?Sized>(rng: &mut R) -> ArticleCard {
    CARDS[rng.gen_range(0..CARDS.len())].to_card()
}

pub fn guide_text(card: &ArticleCard) -> String {
    format!("I found a related article for you: {}", card.title)
}
