use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WarError;

// --- 核心数据结构定义 ---

/// 花色 (Suit)
/// 声明顺序即标准牌堆中的花色顺序
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    pub fn name(&self) -> &'static str {
        match self {
            Suit::Club => "Clubs",
            Suit::Diamond => "Diamonds",
            Suit::Heart => "Hearts",
            Suit::Spade => "Spades",
        }
    }

    /// 牌面代码中使用的单字母
    pub fn letter(&self) -> char {
        match self {
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }

    pub fn from_letter(letter: char) -> Option<Suit> {
        match letter {
            'C' => Some(Suit::Club),
            'D' => Some(Suit::Diamond),
            'H' => Some(Suit::Heart),
            'S' => Some(Suit::Spade),
            _ => None,
        }
    }
}

/// 点数 (FaceValue)，2 到 14
/// J/Q/K/A 记为 11-14，直接比较整数即可决定胜负
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct FaceValue(pub u8);

impl FaceValue {
    pub const TWO: FaceValue = FaceValue(2);
    pub const TEN: FaceValue = FaceValue(10);
    pub const JACK: FaceValue = FaceValue(11);
    pub const QUEEN: FaceValue = FaceValue(12);
    pub const KING: FaceValue = FaceValue(13);
    pub const ACE: FaceValue = FaceValue(14);

    /// 所有合法点数，从小到大
    pub fn all() -> impl Iterator<Item = FaceValue> {
        (Self::TWO.0..=Self::ACE.0).map(FaceValue)
    }

    pub fn is_valid(&self) -> bool {
        (Self::TWO..=Self::ACE).contains(self)
    }

    /// 可读名称，超出 2..=14 的点数显示为 "N/A"
    pub fn name(&self) -> &'static str {
        match self.0 {
            2 => "Two",
            3 => "Three",
            4 => "Four",
            5 => "Five",
            6 => "Six",
            7 => "Seven",
            8 => "Eight",
            9 => "Nine",
            10 => "Ten",
            11 => "Jack",
            12 => "Queen",
            13 => "King",
            14 => "Ace",
            _ => "N/A",
        }
    }

    /// 牌面代码中的点数部分："2".."10"，然后是 "J"、"Q"、"K"、"A"。非法点数为空串。
    pub fn slug(&self) -> String {
        match self.0 {
            2..=10 => self.0.to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            14 => "A".to_string(),
            _ => String::new(),
        }
    }
}

/// 单张扑克牌 (Card)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub value: FaceValue,
}

impl Card {
    pub fn new(suit: Suit, value: u8) -> Card {
        Card { suit, value: FaceValue(value) }
    }

    /// 例如 "Ace of Spades"
    pub fn name(&self) -> String {
        format!("{} of {}", self.value.name(), self.suit.name())
    }

    /// 例如 "AS"、"10C"
    pub fn slug(&self) -> String {
        format!("{}{}", self.value.slug(), self.suit.letter())
    }
}

// --- 格式化与解析 ---

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.value.slug(), self.suit.letter())
    }
}

impl FromStr for Card {
    type Err = WarError;

    /// [`Card::slug`] 的逆操作。花色字母总是最后一个字符，
    /// 所以 "10C" 的点数部分有两位。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next_back().ok_or_else(|| WarError::parse(s, "empty slug"))?;
        let suit = Suit::from_letter(letter).ok_or_else(|| WarError::parse(s, "unknown suit letter"))?;

        let value = match chars.as_str() {
            "J" => FaceValue::JACK,
            "Q" => FaceValue::QUEEN,
            "K" => FaceValue::KING,
            "A" => FaceValue::ACE,
            "" => return Err(WarError::parse(s, "missing face value")),
            digits => {
                if !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(WarError::parse(s, "face value is not an integer"));
                }
                if digits.starts_with('0') {
                    return Err(WarError::parse(s, "face value has a leading zero"));
                }
                let n: u8 = digits
                    .parse()
                    .map_err(|_| WarError::parse(s, "face value is not an integer"))?;
                if !(FaceValue::TWO.0..=FaceValue::TEN.0).contains(&n) {
                    return Err(WarError::parse(s, "numeric face value out of range"));
                }
                FaceValue(n)
            }
        };

        Ok(Card { suit, value })
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use Suit::*;

    #[test]
    fn test_card_names() {
        assert_eq!(Card::new(Club, 2).name(), "Two of Clubs");
        assert_eq!(Card::new(Heart, 3).name(), "Three of Hearts");
        assert_eq!(Card::new(Diamond, 11).name(), "Jack of Diamonds");
        assert_eq!(Card::new(Spade, 14).name(), "Ace of Spades");
    }

    #[test]
    fn test_card_slugs() {
        assert_eq!(Card::new(Club, 2).slug(), "2C");
        assert_eq!(Card::new(Heart, 3).slug(), "3H");
        assert_eq!(Card::new(Club, 10).slug(), "10C");
        assert_eq!(Card::new(Diamond, 11).slug(), "JD");
        assert_eq!(Card::new(Spade, 14).slug(), "AS");
        assert_eq!(Card::new(Spade, 14).to_string(), "AS");
    }

    #[test]
    fn test_invalid_value_fallbacks() {
        let bogus = FaceValue(15);
        assert!(!bogus.is_valid());
        assert_eq!(bogus.name(), "N/A");
        assert_eq!(bogus.slug(), "");
        assert_eq!(FaceValue(1).name(), "N/A");
    }

    #[test]
    fn test_parse_slugs() {
        assert_eq!("2C".parse::<Card>(), Ok(Card::new(Club, 2)));
        assert_eq!("10C".parse::<Card>(), Ok(Card::new(Club, 10)));
        assert_eq!("QH".parse::<Card>(), Ok(Card::new(Heart, 12)));
        assert_eq!("AD".parse::<Card>(), Ok(Card::new(Diamond, 14)));
    }

    #[test]
    fn test_parse_rejects_malformed_slugs() {
        for slug in [
            "", "C", "ZC", "10X", "1C", "11C", "-2C", "2c", "A", "+5C", "05C", "010C", "0C", " 5C", "5 C", "256C",
        ] {
            match slug.parse::<Card>() {
                Err(WarError::Parse { slug: offending, .. }) => assert_eq!(offending, slug),
                other => panic!("expected parse error for {slug:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_every_card_round_trips() {
        for suit in Suit::ALL {
            for value in FaceValue::all() {
                let card = Card { suit, value };
                assert_eq!(card.slug().parse::<Card>(), Ok(card));
            }
        }
    }

    #[test]
    fn test_value_ordering() {
        assert!(FaceValue::ACE > FaceValue::KING);
        assert!(FaceValue::JACK > FaceValue::TEN);
        assert_eq!(FaceValue::all().count(), 13);
    }
}
