//! Template tale synthesis.
//!
//! Used when no generation backend is configured or the configured one cannot
//! be reached. Content is fully determined by the parameters; the title draws
//! one random index into a fixed prefix table.

use rand::Rng;

use taleweaver_types::tale::{AgeBand, GenerationParams, Mood, TaleDraft};

const PARAGRAPH_BREAK: &str = "\n\n";

/// Title prefixes per mood. Every mood has exactly four.
pub fn title_prefixes(mood: Mood) -> &'static [&'static str; 4] {
    match mood {
        Mood::Happy => &["The Joyful", "Happy", "The Wonderful", "The Magical"],
        Mood::Adventurous => &["The Great", "The Daring", "The Epic", "The Incredible"],
        Mood::Educational => &["Discovering", "Learning About", "The Curious", "The Amazing"],
        Mood::Calming => &["The Peaceful", "The Gentle", "Dreaming of", "The Quiet"],
    }
}

/// Build a full draft from the templates.
pub fn draft<R: Rng>(params: &GenerationParams, rng: &mut R) -> TaleDraft {
    TaleDraft {
        title: title(&params.topic, params.mood, rng),
        content: content(params),
    }
}

/// `{prefix} {MainTopic}` where the prefix is drawn uniformly from the mood's
/// table and `MainTopic` is the first whitespace-delimited token of `topic`
/// with its first character upper-cased.
pub fn title<R: Rng>(topic: &str, mood: Mood, rng: &mut R) -> String {
    let prefixes = title_prefixes(mood);
    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    format!("{prefix} {}", capitalize(topic.split_whitespace().next().unwrap_or("")))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Story body: intro, setting, characters, mood middle, topic reinforcement,
/// conclusion. Paragraphs are separated by a blank line.
pub fn content(params: &GenerationParams) -> String {
    let topic = &params.topic;

    let mut opening = intro(params.child_age, topic);
    if !params.setting.is_empty() {
        opening.push_str(&format!(
            " This story takes place in {}, where everything was magical and exciting.",
            params.setting
        ));
    }
    if params.characters.is_empty() {
        opening.push_str(
            " Our story follows a brave little character who loved exploring and learning new things.",
        );
    } else {
        opening.push_str(&format!(
            " The heroes of our story are {}, who were always ready for new adventures.",
            params.characters
        ));
    }

    let reinforcement = format!(
        "As they journeyed through their day, they encountered many interesting things. They learned that {topic} was even more amazing than they had imagined. Every discovery brought new understanding and happiness."
    );

    [
        opening,
        middle(params.mood, topic),
        reinforcement,
        conclusion(params.child_age, topic),
    ]
    .join(PARAGRAPH_BREAK)
}

fn intro(age: AgeBand, topic: &str) -> String {
    match age {
        AgeBand::Preschool => format!(
            "Once upon a time, there was a wonderful world where {topic} was very special."
        ),
        AgeBand::EarlyElementary => format!(
            "In a land not so far away, there was an amazing place where {topic} was the most important thing."
        ),
        AgeBand::UpperElementary => format!(
            "Long ago, in a realm where imagination and reality blend together, there existed a fascinating story about {topic}."
        ),
    }
}

fn middle(mood: Mood, topic: &str) -> String {
    match mood {
        Mood::Happy => "Every day was filled with joy and laughter. The sun shone brightly, and friends played together happily. They discovered that sharing and being kind made everyone feel good inside.".to_string(),
        Mood::Adventurous => "One day, a great challenge appeared! It was time for an exciting adventure. With courage in their hearts, they set off to explore unknown territories and face whatever lay ahead.".to_string(),
        Mood::Educational => format!(
            "There was so much to learn about {topic}! Did you know that understanding how things work can be the greatest adventure? Our heroes discovered fascinating facts and important lessons."
        ),
        Mood::Calming => "The gentle breeze whispered through the trees as stars twinkled in the night sky. Everything was peaceful and calm, perfect for thinking about beautiful dreams.".to_string(),
    }
}

fn conclusion(age: AgeBand, topic: &str) -> String {
    match age {
        AgeBand::Preschool => format!(
            "At the end of the day, everyone was happy and safe. They had learned that {topic} was special because it brought friends together. And they all smiled as they fell asleep, dreaming of tomorrow's adventures."
        ),
        AgeBand::EarlyElementary => format!(
            "After their amazing experiences, they understood something important about {topic}. It wasn't just about the adventure, but about the friends they made and the lessons they learned along the way. As the sun set, they knew tomorrow would bring new discoveries."
        ),
        AgeBand::UpperElementary => format!(
            "As their journey came to a close, they reflected on everything they had experienced. The true value of {topic} wasn't what they had initially thought. It was about growth, understanding, and the connections they had formed. With this new wisdom, they were ready for whatever challenges awaited them next."
        ),
    }
}
