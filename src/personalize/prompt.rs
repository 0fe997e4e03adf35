use std::fmt::Write;

use crate::store::schema::InterestAnswers;

/// Compose the story prompt sent as the `location` field of a generation
/// request. Each non-blank answer contributes one themed line.
pub fn build_prompt(location: &str, interests: &InterestAnswers) -> String {
    let mut prompt = format!("Location: {}\n\n", location.trim());
    prompt.push_str("Create a personalized sustainability awareness story for someone who:\n");

    if let Some(drink) = answer(&interests.drink) {
        let _ = writeln!(prompt, "- {}", drink_line(drink));
    }
    if let Some(place) = answer(&interests.walking_place) {
        let _ = writeln!(prompt, "- {}", walking_line(place));
    }
    if let Some(habit) = answer(&interests.other_habit) {
        let _ = writeln!(prompt, "- {}", habit_line(habit));
    }

    prompt.push_str(
        "\nTone: Empathetic, personal, and action-oriented. Make it feel like this story was created specifically for them.",
    );
    prompt.push_str(
        "\nGoal: Help them understand how climate change and sustainability directly connects to THEIR daily life and habits. Inspire small actions they can take.",
    );
    prompt
}

fn answer(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn drink_line(drink: &str) -> String {
    let lower = drink.to_lowercase();
    if lower.contains("coffee") {
        format!(
            "Drinks {drink} daily - Show how climate change affects coffee production, the farmers who grow it, and what they can do to support sustainable coffee"
        )
    } else if lower.contains("tea") {
        format!(
            "Drinks {drink} daily - Explain how changing rainfall patterns impact tea cultivation and what sustainable choices they can make"
        )
    } else if lower.contains("water") {
        format!(
            "Drinks {drink} - Highlight water conservation importance, local water scarcity issues, and how every drop counts"
        )
    } else {
        format!(
            "Regularly consumes {drink} - Connect this habit to sustainable production and environmental impact"
        )
    }
}

fn walking_line(place: &str) -> String {
    let lower = place.to_lowercase();
    if lower.contains("park") || lower.contains("garden") {
        format!(
            "Walks in {place} - Show how urban green spaces are affected by climate change, importance of tree cover, and biodiversity"
        )
    } else if lower.contains("beach") || lower.contains("coast") {
        format!(
            "Walks at {place} - Illustrate rising sea levels, coastal erosion, plastic pollution in oceans, and marine life impact"
        )
    } else if ["street", "city", "road"].iter().any(|k| lower.contains(k)) {
        format!(
            "Walks on {place} - Address urban heat islands, air quality, vehicle emissions, and benefits of walkable cities"
        )
    } else {
        format!(
            "Walks at {place} - Connect their walking routine to environmental awareness and sustainable transportation choices"
        )
    }
}

fn habit_line(habit: &str) -> String {
    let lower = habit.to_lowercase();
    if lower.contains("cycl") && !lower.contains("recycl") {
        format!(
            "Enjoys {habit} - Celebrate this eco-friendly choice and show broader impact of sustainable transportation"
        )
    } else if lower.contains("garden") {
        format!(
            "Practices {habit} - Highlight urban farming, local food production, and reducing carbon footprint"
        )
    } else if lower.contains("recycl") {
        format!(
            "Engaged in {habit} - Show the journey of recycled materials and importance of waste management"
        )
    } else {
        format!(
            "Has a habit of {habit} - Relate this to sustainable living and environmental consciousness"
        )
    }
}
