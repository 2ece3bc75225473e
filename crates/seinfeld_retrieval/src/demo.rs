//! Illustrative passages served when real dialogue is unavailable.
//!
//! The passages are fixed scenes with a `[topic]` slot. Output depends only
//! on the query text and result count.

use seinfeld_core::{EpisodeMetadata, RetrievalMatch, RetrievalQuery};

const QUOTES: &[char] = &['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', '`'];
const TRAILING_PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?'];

struct DemoScene {
    location: &'static str,
    description: &'static str,
    lead: &'static str,
    dialogue: &'static str,
}

const SCENES: [DemoScene; 3] = [
    DemoScene {
        location: "Jerry's Apartment",
        description: "Classic observational comedy setup",
        lead: "JERRY",
        dialogue: "JERRY: See, that's the thing about [topic]. Everyone acts like it's normal,
but have you ever really thought about it? I mean, really thought about it?

GEORGE: What's there to think about? It's [topic]!

JERRY: Exactly! That's my point. We just accept it.

GEORGE: (getting agitated) Well what am I supposed to do, Jerry? Question
everything? I've got enough problems!",
    },
    DemoScene {
        location: "Monk's Coffee Shop",
        description: "George's paranoid interpretation",
        lead: "GEORGE",
        dialogue: "GEORGE: You know what I think? I think this whole [topic] thing is a conspiracy.

ELAINE: George, not everything is a conspiracy.

GEORGE: That's exactly what they want you to think!

KRAMER: (sliding into booth) I'm telling you, I've been saying this for years.
[Topic]! It's all connected!

JERRY: Here we go.",
    },
    DemoScene {
        location: "Jerry's Apartment",
        description: "Kramer's enthusiastic scheme",
        lead: "KRAMER",
        dialogue: "KRAMER: Jerry! Jerry! You're not gonna believe this!

JERRY: What now?

KRAMER: I've figured out the whole [topic] situation. It's genius!

JERRY: Kramer, the last time you had a genius idea, you ended up in the
Hudson River.

KRAMER: That was different. That was a miscalculation. This? This is foolproof!

JERRY: (to camera) Nothing's foolproof when it comes to Kramer.",
    },
];

/// The word substituted into the illustrative passages.
///
/// The first whitespace-separated token of the query, with surrounding
/// quotes and trailing punctuation removed. Falls back to `"this"`.
///
/// ```
/// use seinfeld_retrieval::demo_topic;
///
/// assert_eq!(demo_topic("Jerry's smart speaker"), "Jerry's");
/// assert_eq!(demo_topic("\"Parking,\" spaces"), "Parking");
/// assert_eq!(demo_topic("   "), "this");
/// ```
pub fn demo_topic(query_text: &str) -> String {
    query_text
        .split_whitespace()
        .next()
        .map(|token| {
            token
                .trim_start_matches(QUOTES)
                .trim_end_matches(|c: char| QUOTES.contains(&c) || TRAILING_PUNCTUATION.contains(&c))
        })
        .filter(|token| !token.is_empty())
        .unwrap_or("this")
        .to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the illustrative passages for a query, at most `result_count` of them.
///
/// Scores are always 0.0 so they cannot be mistaken for real matches.
pub fn demo_passages(query: &RetrievalQuery) -> Vec<RetrievalMatch> {
    let topic = demo_topic(query.query_text());
    let capitalized = capitalize(&topic);

    SCENES
        .iter()
        .take(query.result_count())
        .map(|scene| RetrievalMatch {
            dialogue_text: scene
                .dialogue
                .replace("[topic]", &topic)
                .replace("[Topic]", &capitalized),
            episode_metadata: EpisodeMetadata {
                season: None,
                episode: None,
                character: Some(scene.lead.to_string()),
            },
            relevance_score: 0.0,
            context: Some(format!("{}: {}", scene.location, scene.description)),
        })
        .collect()
}
