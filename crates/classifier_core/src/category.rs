//! The closed set of CIFAR-10 labels the prediction endpoint returns.

use std::fmt;

/// One of the ten CIFAR-10 categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Airplane,
    Automobile,
    Bird,
    Cat,
    Deer,
    Dog,
    Frog,
    Horse,
    Ship,
    Truck,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 10] = [
        Category::Airplane,
        Category::Automobile,
        Category::Bird,
        Category::Cat,
        Category::Deer,
        Category::Dog,
        Category::Frog,
        Category::Horse,
        Category::Ship,
        Category::Truck,
    ];

    /// Label as sent by the endpoint.
    pub fn name(self) -> &'static str {
        match self {
            Category::Airplane => "airplane",
            Category::Automobile => "automobile",
            Category::Bird => "bird",
            Category::Cat => "cat",
            Category::Deer => "deer",
            Category::Dog => "dog",
            Category::Frog => "frog",
            Category::Horse => "horse",
            Category::Ship => "ship",
            Category::Truck => "truck",
        }
    }

    /// Emoji glyph rendered next to the label.
    pub fn glyph(self) -> &'static str {
        match self {
            Category::Airplane => "✈",
            Category::Automobile => "🚗",
            Category::Bird => "🐦",
            Category::Cat => "🐱",
            Category::Deer => "🦌",
            Category::Dog => "🐕",
            Category::Frog => "🐸",
            Category::Horse => "🐴",
            Category::Ship => "⛵",
            Category::Truck => "🚚",
        }
    }

    /// Matches a label case-insensitively, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn display_order_matches_cifar_index_order() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "airplane",
                "automobile",
                "bird",
                "cat",
                "deer",
                "dog",
                "frog",
                "horse",
                "ship",
                "truck"
            ]
        );
    }

    #[rstest]
    #[case("cat", Some(Category::Cat))]
    #[case(" Truck ", Some(Category::Truck))]
    #[case("AIRPLANE", Some(Category::Airplane))]
    #[case("unicorn", None)]
    #[case("", None)]
    fn from_label_matches_closed_set(#[case] label: &str, #[case] expected: Option<Category>) {
        assert_eq!(Category::from_label(label), expected);
    }
}
