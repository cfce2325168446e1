// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification categories and the exemplar text embedded for each.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What the user is trying to do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    Question,
    Command,
    DecisionMaking,
    ProblemSolving,
    CreativeRequest,
    Complaint,
    CasualChat,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Question,
        Intent::Command,
        Intent::DecisionMaking,
        Intent::ProblemSolving,
        Intent::CreativeRequest,
        Intent::Complaint,
        Intent::CasualChat,
    ];

    pub fn exemplar(self) -> &'static str {
        match self {
            Intent::Question => {
                "What is this, how does it work, why does it happen? I want to understand and learn the answer."
            }
            Intent::Command => {
                "Do this task for me now: list, summarize, convert, send or update the following."
            }
            Intent::DecisionMaking => {
                "Should I choose this option or that one? Help me decide, weigh the tradeoffs and pick the best path."
            }
            Intent::ProblemSolving => {
                "Something is broken and not working. Help me fix this problem, solve the issue and troubleshoot the error."
            }
            Intent::CreativeRequest => {
                "Write, create or design something new: brainstorm ideas, draft a story, invent a slogan."
            }
            Intent::Complaint => {
                "This is frustrating and unacceptable. I am annoyed and disappointed with how badly this went."
            }
            Intent::CasualChat => "Hi there, hello, thanks, how are you doing today? Just chatting.",
        }
    }
}

/// Subject area of the query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Domain {
    Business,
    Technical,
    Financial,
    Legal,
    Health,
    Personal,
    General,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Business,
        Domain::Technical,
        Domain::Financial,
        Domain::Legal,
        Domain::Health,
        Domain::Personal,
        Domain::General,
    ];

    pub fn exemplar(self) -> &'static str {
        match self {
            Domain::Business => {
                "Business strategy, customers, marketing, sales, operations, growth and competitors."
            }
            Domain::Technical => {
                "Software engineering, code, APIs, databases, servers, architecture, algorithms and debugging."
            }
            Domain::Financial => {
                "Money, revenue, profit, ROI, margin, pricing, budget, cash flow, investment and taxes."
            }
            Domain::Legal => {
                "Contracts, law, liability, compliance, regulations, lawsuits, terms and legal rights."
            }
            Domain::Health => {
                "Health, medical symptoms, doctors, medication, diet, exercise, sleep and wellbeing."
            }
            Domain::Personal => {
                "My family, relationships, friends, feelings, personal life and private matters."
            }
            Domain::General => "General knowledge, everyday facts, trivia and common topics.",
        }
    }

    /// Domains where a wrong answer carries real-world risk.
    pub fn is_high_stakes(self) -> bool {
        matches!(self, Domain::Financial | Domain::Legal | Domain::Health)
    }
}

/// Emotional register of the query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Urgent,
    Anxious,
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Positive,
        Tone::Negative,
        Tone::Urgent,
        Tone::Anxious,
        Tone::Neutral,
    ];

    pub fn exemplar(self) -> &'static str {
        match self {
            Tone::Positive => "This is great, I am excited and happy, thank you, love it!",
            Tone::Negative => "This is bad and disappointing, I hate how terrible it is.",
            Tone::Urgent => "Urgent: I need this immediately, as soon as possible, right now, deadline today!",
            Tone::Anxious => "I am worried and nervous, scared this might go wrong, stressed and unsure.",
            Tone::Neutral => "Please provide the information. Here are the details of the request.",
        }
    }
}

/// Identifies one precomputed reference embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    Intent(Intent),
    Domain(Domain),
    Tone(Tone),
}

impl Reference {
    /// Every reference, in a stable order.
    pub fn all() -> impl Iterator<Item = Reference> {
        Intent::ALL
            .into_iter()
            .map(Reference::Intent)
            .chain(Domain::ALL.into_iter().map(Reference::Domain))
            .chain(Tone::ALL.into_iter().map(Reference::Tone))
    }

    pub fn exemplar(self) -> &'static str {
        match self {
            Reference::Intent(i) => i.exemplar(),
            Reference::Domain(d) => d.exemplar(),
            Reference::Tone(t) => t.exemplar(),
        }
    }
}
