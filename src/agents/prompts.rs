//! Instruction builders for the five pipeline agents.
//!
//! Each builder is a fixed mapping from the typed preference enums to text.
//! Unknown labels never reach this module: they are coerced to defaults when
//! [`Preferences`](crate::types::Preferences) is deserialized.

use crate::types::{Depth, Focus, Tone};

/// Stage whose focus-specific guidance is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSlot {
    Profiler,
    Selector,
    Synthesizer,
    Editor,
}

pub const REFINER_PROMPT: &str = r#"You turn a reader's request into search keywords for a news search engine.

1. Work out the fundamental subject of the request.
2. Drop conversational filler such as "what's the latest on" or "tell me about".
3. Never add words like "news", "latest", "breaking" or "updates"; the search system adds them.
4. Reply with the essential keywords only, on a single line, with no explanation.

Examples:
- "What's going on with the tensions in the Middle East?" -> Middle East tensions
- "I want to know more about recent AI advancements" -> AI advancements
- "tech layoffs" -> tech layoffs

Most requests are already good search terms. When that is the case, return them unchanged."#;

pub fn focus_instruction(focus: Focus, slot: FocusSlot) -> &'static str {
    match (focus, slot) {
        (Focus::JustTheFacts, FocusSlot::Profiler) => {
            "Label each article by factual density (high/medium/low), source authority (official/expert/journalist) and data richness (statistics/quotes/claims). Flag opinion pieces separately from straight reporting."
        }
        (Focus::JustTheFacts, FocusSlot::Selector) => {
            "Prefer articles with high factual density and official sources. Cover different data points without repetition and skip opinion pieces unless they carry exclusive data."
        }
        (Focus::JustTheFacts, FocusSlot::Synthesizer) => {
            "Structure: core facts, key data points, official statements, timeline. When sources disagree on a fact, give both versions and say who reports which."
        }
        (Focus::JustTheFacts, FocusSlot::Editor) => {
            "Favor precision: exact numbers, direct quotes and a logical order. Make complex data easy to follow without oversimplifying it."
        }
        (Focus::HumanImpact, FocusSlot::Profiler) => {
            "Label each article by human story content (personal/community/statistical), affected groups (workers/families/students/elderly) and proximity (first-hand account or analysis). Note quotes from affected people versus expert commentary."
        }
        (Focus::HumanImpact, FocusSlot::Selector) => {
            "Cover different affected groups rather than one group many times. Prefer first-hand accounts and direct quotes over statistical overviews."
        }
        (Focus::HumanImpact, FocusSlot::Synthesizer) => {
            "Structure: personal stories, community effects, demographic breakdown, long-term consequences. Lead with concrete examples and then connect them to the wider pattern."
        }
        (Focus::HumanImpact, FocusSlot::Editor) => {
            "Center the people involved. Use names, places and quotes, and show how daily life changes for individuals and communities."
        }
        (Focus::TheClash, FocusSlot::Profiler) => {
            "Label each article's stance (for/against/neutral), its key arguments, the evidence it offers and its main spokespeople. Note which points are disputed and which are shared."
        }
        (Focus::TheClash, FocusSlot::Selector) => {
            "Pick articles that represent genuinely different positions, each with its strongest argument. Add neutral analysis when it gives useful context."
        }
        (Focus::TheClash, FocusSlot::Synthesizer) => {
            "Structure: the central dispute, each side's core argument, supporting evidence, common ground, what is at stake. Show where the positions diverge and where they meet."
        }
        (Focus::TheClash, FocusSlot::Editor) => {
            "Make the structure of the debate obvious. Contrast the arguments and explain why each side believes what it does."
        }
        (Focus::HiddenAngles, FocusSlot::Profiler) => {
            "Label each article by uniqueness (exclusive/underreported/common), placement (headline/buried/sidebar) and perspective rarity (mainstream/alternative/specialized). Flag details that appear in few sources."
        }
        (Focus::HiddenAngles, FocusSlot::Selector) => {
            "Prefer articles carrying exclusive information, unusual perspectives or buried details. Every pick should reveal something the others miss."
        }
        (Focus::HiddenAngles, FocusSlot::Synthesizer) => {
            "Structure: underreported context, overlooked details, alternative readings, hidden connections. Surface what changes the reader's understanding of the story."
        }
        (Focus::HiddenAngles, FocusSlot::Editor) => {
            "Highlight the surprising facts and the unexpected links between them, and explain why a small detail matters more than it seems."
        }
        (Focus::MoneyTrail, FocusSlot::Profiler) => {
            "Label each article by financial specificity (exact amounts/vague references), stakeholders (who pays/who profits) and mechanisms (funding, revenue, costs). Track every amount mentioned."
        }
        (Focus::MoneyTrail, FocusSlot::Selector) => {
            "Pick articles that together show the full money picture: sources of funds, beneficiaries, costs and wider economic effects, from investor, consumer, taxpayer and worker angles."
        }
        (Focus::MoneyTrail, FocusSlot::Synthesizer) => {
            "Structure: financial overview, where the money comes from, who benefits and by how much, true costs, ripple effects. Keep every figure."
        }
        (Focus::MoneyTrail, FocusSlot::Editor) => {
            "Make the numbers relatable with comparisons, and show cause and effect in how the money moves."
        }
    }
}

/// How many articles the selector is asked to pick.
///
/// This is an instruction to the agent, not an enforced count.
pub fn selection_count_instruction(depth: Depth) -> &'static str {
    match depth {
        Depth::Quick => "Select exactly 3 articles that show the clearest contrast.",
        Depth::Standard => {
            "Select 4-5 articles that span the full debate: mainstream, opposition, expert and at least one unexpected perspective."
        }
        Depth::Deep => {
            "Select 6-8 articles that reveal the full complexity, including edge cases, minority viewpoints, expert analysis and international perspectives."
        }
    }
}

pub fn synthesis_length_instruction(depth: Depth) -> &'static str {
    match depth {
        Depth::Quick => "Write at most 3 tight paragraphs and skip minor details.",
        Depth::Standard => {
            "Write 3-4 solid paragraphs: the event and first reactions, the key disagreements and why they exist, and what it says about the wider issue."
        }
        Depth::Deep => {
            "Write 5-6 detailed paragraphs covering full context, nuanced disagreements, what each side ignores and where it leads."
        }
    }
}

pub fn reading_time_instruction(depth: Depth) -> &'static str {
    match depth {
        Depth::Quick => {
            "Readable in 20 seconds: short sentences, three short paragraphs, the key conflict in bold."
        }
        Depth::Standard => {
            "Readable in about 2 minutes: four medium to six short paragraphs with enough context to see why the sides disagree."
        }
        Depth::Deep => {
            "A rich read for engaged readers: at least five solid paragraphs with illuminating detail and connections to bigger patterns."
        }
    }
}

fn tone_voice(tone: Tone) -> &'static str {
    match tone {
        Tone::Grandma => {
            "Write like a warm, wise grandmother explaining the news over tea. Use everyday comparisons and simple words, acknowledge each side kindly, add a little life wisdom and end with practical advice."
        }
        Tone::NewsWithAttitude => {
            "Write like a sharp analyst talking to a clever friend. Blend the reported facts with your own observations, connect the dots, notice timing and patterns, and always make clear what is reported and what is your take."
        }
        Tone::GenZ => {
            "Write like the smartest person in the group chat. Open with the hook, recap the sides like a plot, call out spin, keep sentences short and phone-friendly, and end with a vibe check on why it matters."
        }
        Tone::SharpAndSnappy => {
            "Write like a precision editor. The first sentence carries the whole story, conflicts go in bullets, numbers beat adjectives, context goes in fragments and the last line is the takeaway."
        }
    }
}

pub fn profiler_prompt(focus: Focus) -> String {
    format!(
        r#"You profile news articles for a multi-perspective news digest.

{focus}

For every article produce a JSON object with:
- "id": the article's original id, copied exactly
- "title": the article's original title
- "tone": one of "neutral", "supportive", "critical", "speculative", "alarmist"
- "perspective": 3-5 topic-specific tags shaped by the guidance above
- "source_type": one of "news report", "opinion/editorial", "analysis", "press release", "blog/post"
- "region": one of "US", "EU", "UK", "Global", "Middle East", "Asia", "Africa", "Local/Regional"

Reply with a single JSON array of these objects and nothing else: no prose, no markdown."#,
        focus = focus_instruction(focus, FocusSlot::Profiler)
    )
}

pub fn selector_prompt(focus: Focus, depth: Depth) -> String {
    format!(
        r#"You choose which profiled articles make it into a balanced news digest. Your goal is to break echo chambers.

{focus}

You receive a JSON array of article profiles.
{count}
Balance perspectives, tones, source types and regions. Every pick should add something the others lack.

Reply with a raw JSON array of the selected article ids only, for example ["id1", "id2", "id3"]. No explanation, no markdown."#,
        focus = focus_instruction(focus, FocusSlot::Selector),
        count = selection_count_instruction(depth)
    )
}

pub fn synthesizer_prompt(focus: Focus, depth: Depth) -> String {
    format!(
        r#"You are a journalist who shows readers how the same story looks different depending on who tells it.

{focus}

You receive a JSON array of articles chosen for their contrasting perspectives.
{length}

Attribute every claim inline as a markdown link, e.g. [Reuters](url) reports X while [Fox](url) stresses Y. Make disagreements obvious, connect the dots and stay skeptical but fair. Another editor will handle tone; focus on structure and contrast."#,
        focus = focus_instruction(focus, FocusSlot::Synthesizer),
        length = synthesis_length_instruction(depth)
    )
}

pub fn editor_prompt(focus: Focus, depth: Depth, tone: Tone) -> String {
    format!(
        r#"You rewrite a multi-source news synthesis for its final readers.

Voice ({tone_label}): {voice}

Focus: {focus}

Length: {length}

You receive the synthesis as markdown. Keep every [Source](URL) link and cite a source for every claim taken from the articles."#,
        tone_label = tone.label(),
        voice = tone_voice(tone),
        focus = focus_instruction(focus, FocusSlot::Editor),
        length = reading_time_instruction(depth)
    )
}
