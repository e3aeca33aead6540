use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IconUrls {
    pub medium: Option<String>,
    pub evolution_medium: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub name: String,
    pub id: Option<u32>,
    pub rarity: Option<String>,
    pub level: Option<i32>,
    pub max_level: Option<i32>,
    pub elixir_cost: Option<u32>,
    pub evolution_level: Option<u32>,
    pub max_evolution_level: Option<u32>,
    pub star_level: Option<u32>,
    pub icon_urls: Option<IconUrls>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardList {
    #[serde(default)]
    pub items: Vec<Card>,
}

impl CardList {
    pub fn by_rarity(&self, rarity: &str) -> Vec<Card> {
        self.items
            .iter()
            .filter(|c| {
                c.rarity
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case(rarity))
            })
            .cloned()
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&Card> {
        self.items.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CardList {
        serde_json::from_value(serde_json::json!({
            "items": [
                {"name": "Knight", "id": 26000000, "maxLevel": 15, "elixirCost": 3, "rarity": "common"},
                {"name": "Mirror", "id": 28000006, "maxLevel": 10, "rarity": "epic"},
                {"name": "The Log", "id": 28000011, "maxLevel": 8, "elixirCost": 2, "rarity": "Legendary"}
            ],
            "supportItems": []
        }))
        .unwrap()
    }

    #[test]
    fn filters_rarity_case_insensitively() {
        let cards = catalog();
        let legendary = cards.by_rarity("LEGENDARY");
        assert_eq!(legendary.len(), 1);
        assert_eq!(legendary[0].name, "The Log");
        assert!(cards.by_rarity("champion").is_empty());
    }

    #[test]
    fn finds_card_by_name() {
        let cards = catalog();
        assert_eq!(cards.find("knight").and_then(|c| c.elixir_cost), Some(3));
        assert!(cards.find("Goblin").is_none());
    }

    #[test]
    fn missing_fields_are_not_serialized() {
        let cards = catalog();
        let mirror = serde_json::to_value(cards.find("Mirror").unwrap()).unwrap();
        assert!(mirror.get("elixirCost").is_none());
        assert!(mirror.get("level").is_none());
        assert_eq!(mirror["maxLevel"], 10);
    }
}
