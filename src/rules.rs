//! Local keyword rules used whenever the remote model is unavailable

/// Categories in the order they are tested; the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category
{   Exam
  , Tired
  , Stuck
  , Sad
  , Generic
}

const EXAM_WORDS: &[&str] = &["exam", "test", "quiz", "midterm", "final"];
const TIRED_WORDS: &[&str] = &["tired", "exhausted", "burnout"];
const STUCK_WORDS: &[&str]
  = &["stuck", "blocked", "can't", "cannot", "unable"];
const SAD_WORDS: &[&str] = &["sad", "down", "depressed", "unhappy"];

const EXAM_TEMPLATE: [&str; 3] =
[   "You've prepared for this! Trust your knowledge and take it one question at a time. 📚"
  , "Take deep breaths before starting. A calm mind recalls information better than a stressed one. 🧘"
  , "Remember: You don't need perfection, just progress. Answer what you know first, then tackle the rest. ✨"
];

const TIRED_TEMPLATE: [&str; 3] =
[   "You're allowed to rest — take a short, intentional break and come back with fresh energy."
  , "Break your work into 15-minute sprints; small wins will rebuild momentum."
  , "Celebrate one tiny thing you did well today, however small."
];

const STUCK_TEMPLATE: [&str; 3] =
[   "Try one small experiment — a tiny step reduces decision friction and often reveals the way forward."
  , "Ask a colleague or write down the exact constraint; naming it often clarifies a solution."
  , "If it's big, split it into 'next actions' you can complete in under 30 minutes."
];

const SAD_TEMPLATE: [&str; 3] =
[   "You matter. Name one thing that made you smile recently and keep it close."
  , "Do a 5-minute grounding exercise: breathe deeply and list 3 facts around you."
  , "If this persists, consider reaching out to someone you trust or a professional."
];

const GENERIC_TEMPLATE: [&str; 3] =
[   "You're closer than you think — focus on the next small step and start there."
  , "Set a 25-minute timer and do one thing; momentum builds quickly from action."
  , "Remember progress beats perfection: aim for progress today, no matter how small."
];

impl Category
{   /// Classify by substring match on the lowercased input.
    pub fn classify(user_input: &str) -> Category
    {   let text = user_input.to_lowercase();
        let hit = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if hit(EXAM_WORDS)
        {   Category::Exam
        } else if hit(TIRED_WORDS)
        {   Category::Tired
        } else if hit(STUCK_WORDS)
        {   Category::Stuck
        } else if hit(SAD_WORDS)
        {   Category::Sad
        } else
        {   Category::Generic
        }
    }

    pub fn template(&self) -> &'static [&'static str; 3]
    {   match self
        {   Category::Exam => &EXAM_TEMPLATE
          , Category::Tired => &TIRED_TEMPLATE
          , Category::Stuck => &STUCK_TEMPLATE
          , Category::Sad => &SAD_TEMPLATE
          , Category::Generic => &GENERIC_TEMPLATE
        }
    }
}

/// Fixed three-message template for the input's category.
pub fn motivate(user_input: &str) -> Vec<String>
{   Category::classify(user_input)
      .template()
      .iter()
      .map(|s| s.to_string())
      .collect()
}
