/// Tags whose objects paint behind everything else in their layer.
const BACKDROP_TAGS: &[&str] = &[
    "sky", "grass", "field", "ground", "water", "sand", "sea", "ocean", "lake", "meadow", "lawn",
    "snow", "backdrop", "background", "horizon",
];

/// Known semantic categories with canned realism templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Tree,
    House,
    Person,
    Car,
    Bush,
    Flower,
    Mountain,
    Cloud,
    Sun,
    Bird,
    Sky,
    /// Grass, field, ground and similar terrain.
    Ground,
}

impl Category {
    /// Key used in the enrichment minimum-shape table.
    pub fn key(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::House => "house",
            Self::Person => "person",
            Self::Car => "car",
            Self::Bush => "bush",
            Self::Flower => "flower",
            Self::Mountain => "mountain",
            Self::Cloud => "cloud",
            Self::Sun => "sun",
            Self::Bird => "bird",
            Self::Sky => "sky",
            Self::Ground => "ground",
        }
    }

    /// Sky and terrain categories span a whole band instead of standing in it.
    pub fn is_backdrop(self) -> bool {
        matches!(self, Self::Sky | Self::Ground)
    }

    /// Resolve a free-form tag ("oak tree", "Grass field") to a category.
    ///
    /// The last matching word wins, so "tree house" is a house.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag_words(tag).filter_map(|w| Self::from_word(&w)).last()
    }

    fn from_word(word: &str) -> Option<Self> {
        let c = match word {
            "tree" | "trees" | "oak" | "pine" => Self::Tree,
            "house" | "home" | "cottage" | "cabin" => Self::House,
            "person" | "man" | "woman" | "child" | "kid" | "people" | "figure" => Self::Person,
            "car" | "truck" | "vehicle" => Self::Car,
            "bush" | "shrub" | "hedge" => Self::Bush,
            "flower" | "flowers" | "rose" | "tulip" | "daisy" => Self::Flower,
            "mountain" | "mountains" | "hill" | "hills" => Self::Mountain,
            "cloud" | "clouds" => Self::Cloud,
            "sun" => Self::Sun,
            "bird" | "birds" => Self::Bird,
            "sky" => Self::Sky,
            "grass" | "field" | "ground" | "meadow" | "lawn" => Self::Ground,
            _ => return None,
        };
        Some(c)
    }
}

/// Return `true` when `tag` names backdrop content (sky, grass, water, ...).
pub fn is_backdrop_tag(tag: Option<&str>) -> bool {
    tag.is_some_and(|t| tag_words(t).any(|w| BACKDROP_TAGS.contains(&w.as_str())))
}

/// Return `true` when `tag` describes a person.
pub fn is_person_tag(tag: Option<&str>) -> bool {
    tag.and_then(Category::from_tag) == Some(Category::Person)
}

/// Return `true` when `tag` describes terrain (grass, field, ground, ...).
pub fn is_ground_like_tag(tag: Option<&str>) -> bool {
    tag.is_some_and(|t| {
        tag_words(t).any(|w| {
            matches!(
                w.as_str(),
                "grass" | "field" | "ground" | "meadow" | "lawn" | "sand" | "snow" | "water"
            )
        })
    })
}

/// Lowercased alphanumeric words of `s`.
pub(crate) fn tag_words(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/semantic.rs"]
mod tests;
