use crate::feed::item::ValidationKind;

pub struct QuizOptionTemplate {
    pub id: &'static str,
    pub text: &'static str,
    pub emoji: &'static str,
}

pub struct QuizTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub options: &'static [QuizOptionTemplate],
}

pub struct ChallengeTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points: u32,
    pub validation: ValidationKind,
    pub instruction: Option<&'static str>,
}

pub struct TopicTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub location: &'static str,
}

const fn opt(id: &'static str, text: &'static str, emoji: &'static str) -> QuizOptionTemplate {
    QuizOptionTemplate { id, text, emoji }
}

const GREENHOUSE: QuizTemplate = QuizTemplate {
    title: "What is the greenhouse effect?",
    description: "Test your sustainability knowledge",
    icon: "🌍",
    options: &[
        opt("a", "Trapping heat in atmosphere", "🔥"),
        opt("b", "Growing plants indoors", "🌱"),
        opt("c", "Solar panel energy", "☀️"),
        opt("d", "Weather patterns", "🌧️"),
    ],
};

const RENEWABLE: QuizTemplate = QuizTemplate {
    title: "Which is renewable energy?",
    description: "Choose the sustainable option",
    icon: "⚡",
    options: &[
        opt("a", "Coal Power", "⛏️"),
        opt("b", "Wind Energy", "💨"),
        opt("c", "Natural Gas", "🔥"),
        opt("d", "Nuclear Energy", "⚛️"),
    ],
};

const CARBON_FOOTPRINT: QuizTemplate = QuizTemplate {
    title: "What does carbon footprint mean?",
    description: "Understanding environmental impact",
    icon: "👣",
    options: &[
        opt("a", "Shoe size measurement", "👟"),
        opt("b", "CO2 emissions produced", "💨"),
        opt("c", "Forest area size", "🌳"),
        opt("d", "Energy consumption", "⚡"),
    ],
};

const REDUCE_WASTE: QuizTemplate = QuizTemplate {
    title: "Most effective way to reduce waste?",
    description: "Pick the best sustainable practice",
    icon: "♻️",
    options: &[
        opt("a", "Reduce & Reuse", "🔄"),
        opt("b", "Just Recycle", "♻️"),
        opt("c", "Burn Trash", "🔥"),
        opt("d", "Landfill Only", "🗑️"),
    ],
};

const WATER_POLLUTION: QuizTemplate = QuizTemplate {
    title: "Which pollutes water most?",
    description: "Identify the major threat",
    icon: "💧",
    options: &[
        opt("a", "Plastic Waste", "🥤"),
        opt("b", "Fish Swimming", "🐟"),
        opt("c", "Rainfall", "🌧️"),
        opt("d", "Boat Traffic", "⛵"),
    ],
};

const BIODIVERSITY: QuizTemplate = QuizTemplate {
    title: "What is biodiversity?",
    description: "Learn about ecosystem health",
    icon: "🦋",
    options: &[
        opt("a", "Variety of life forms", "🌺"),
        opt("b", "Type of fuel", "⛽"),
        opt("c", "Weather pattern", "🌤️"),
        opt("d", "Soil quality", "🌱"),
    ],
};

const PUBLIC_TRANSPORT: ChallengeTemplate = ChallengeTemplate {
    title: "Public Transport Champion",
    description: "Upload your bus or train ticket to prove sustainable travel",
    icon: "🚆",
    points: 50,
    validation: ValidationKind::Ticket,
    instruction: Some("Take a clear photo of your bus/train ticket"),
};

const WATER_PLANT: ChallengeTemplate = ChallengeTemplate {
    title: "Water a Plant Challenge",
    description: "Record a video of you watering a plant to support green life",
    icon: "🌱",
    points: 40,
    validation: ValidationKind::PlantWatering,
    instruction: Some("Show yourself watering a plant"),
};

const ZERO_WASTE: ChallengeTemplate = ChallengeTemplate {
    title: "Zero Waste Day",
    description: "Go one full day without generating any plastic waste",
    icon: "♻️",
    points: 50,
    validation: ValidationKind::None,
    instruction: None,
};

const PLANT_TREE: ChallengeTemplate = ChallengeTemplate {
    title: "Plant a Tree Challenge",
    description: "Plant one tree and share your contribution to a greener planet",
    icon: "🌳",
    points: 100,
    validation: ValidationKind::None,
    instruction: None,
};

const CLEAN_PARK: ChallengeTemplate = ChallengeTemplate {
    title: "Clean Local Park",
    description: "Pick up litter from your neighborhood park for 1 hour",
    icon: "🧹",
    points: 75,
    validation: ValidationKind::None,
    instruction: None,
};

const ENERGY_FREE_HOUR: ChallengeTemplate = ChallengeTemplate {
    title: "Energy Free Hour",
    description: "Switch off all electronics for one hour during peak time",
    icon: "💡",
    points: 40,
    validation: ValidationKind::None,
    instruction: None,
};

const COMPOSTING: ChallengeTemplate = ChallengeTemplate {
    title: "Composting Starter",
    description: "Start your own compost bin at home",
    icon: "🌱",
    points: 60,
    validation: ValidationKind::None,
    instruction: None,
};

/// Quiz and challenge tables for one kind of feed. Lookups cycle modulo
/// the table length.
pub struct Catalog {
    pub quizzes: &'static [QuizTemplate],
    pub challenges: &'static [ChallengeTemplate],
}

impl Catalog {
    pub fn quiz(&self, index: usize) -> &'static QuizTemplate {
        &self.quizzes[index % self.quizzes.len()]
    }

    pub fn challenge(&self, index: usize) -> &'static ChallengeTemplate {
        &self.challenges[index % self.challenges.len()]
    }
}

/// Cards mixed between backend videos.
pub const FEED: Catalog = Catalog {
    quizzes: &[GREENHOUSE, RENEWABLE, CARBON_FOOTPRINT, REDUCE_WASTE],
    challenges: &[
        PUBLIC_TRANSPORT,
        WATER_PLANT,
        ZERO_WASTE,
        PLANT_TREE,
        CLEAN_PARK,
        ENERGY_FREE_HOUR,
    ],
};

/// Cards mixed into the offline topic feed.
pub const OFFLINE: Catalog = Catalog {
    quizzes: &[
        GREENHOUSE,
        RENEWABLE,
        CARBON_FOOTPRINT,
        REDUCE_WASTE,
        WATER_POLLUTION,
        BIODIVERSITY,
    ],
    challenges: &[
        PUBLIC_TRANSPORT,
        WATER_PLANT,
        ZERO_WASTE,
        PLANT_TREE,
        CLEAN_PARK,
        COMPOSTING,
    ],
};

/// Topics for the offline feed shown when the backend has no videos.
pub const TOPICS: &[TopicTemplate] = &[
    TopicTemplate {
        title: "Your Neighborhood in 2045",
        description: "See how rising temperatures will change your daily walk",
        location: "Local Park",
    },
    TopicTemplate {
        title: "Coffee Crisis Coming",
        description: "Climate change threatens your morning coffee",
        location: "Coffee Belt",
    },
    TopicTemplate {
        title: "Coastal Cities Rising Seas",
        description: "Watch how sea levels impact coastal communities",
        location: "Mumbai Coast",
    },
    TopicTemplate {
        title: "Vanishing Winters",
        description: "How warmer winters affect your favorite season",
        location: "Delhi",
    },
    TopicTemplate {
        title: "Heatwave Tomorrow",
        description: "Experience the future of extreme heat days",
        location: "Your City",
    },
    TopicTemplate {
        title: "Monsoon Disrupted",
        description: "See how rainfall patterns are shifting",
        location: "Kerala",
    },
    TopicTemplate {
        title: "Wildlife Migration",
        description: "Birds and animals moving due to climate",
        location: "Local Forest",
    },
    TopicTemplate {
        title: "Urban Heat Islands",
        description: "Why cities are getting unbearably hot",
        location: "City Center",
    },
];

pub const TOPIC_CATEGORIES: &[&str] = &["climate-impact", "personal-story", "future-vision"];

pub fn quiz(index: usize) -> &'static QuizTemplate {
    FEED.quiz(index)
}

pub fn challenge(index: usize) -> &'static ChallengeTemplate {
    FEED.challenge(index)
}

pub fn topic(index: usize) -> &'static TopicTemplate {
    &TOPICS[index % TOPICS.len()]
}

pub fn topic_category(index: usize) -> &'static str {
    TOPIC_CATEGORIES[index % TOPIC_CATEGORIES.len()]
}
