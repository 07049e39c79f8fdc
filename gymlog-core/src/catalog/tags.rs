pub static EXERCISE_TAGS: &[&str] = &[
    "chest",
    "biceps",
    "cardio",
    "cycling",
    "running",
    "free weight",
    "machine",
    "triceps",
    "legs",
    "back",
    "shoulders",
    "abs",
    "core",
    "HIIT",
    "yoga",
    "pilates",
    "stretching",
    "balance",
    "functional training",
    "sprints",
    "resistance",
    "endurance",
    "circuit training",
    "plyometrics",
    "calisthenics",
    "glutes",
    "hamstrings",
    "quads",
    "obliques",
    "warmup",
    "cooldown",
    "recovery",
    "flexibility",
    "isolation",
    "compound",
];

pub fn is_known_tag(tag: &str) -> bool {
    EXERCISE_TAGS.contains(&tag)
}
