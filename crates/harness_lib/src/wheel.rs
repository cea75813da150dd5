use std::fmt;

/// Wheel numbers in physical order. Starts with green zero, then red 32, ends with black 26.
pub const WHEEL_MAPPING: [u8; 37] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

/// Split pairs on the 3-column table, left-right then top-bottom, in the order the game
/// indexes them.
#[rustfmt::skip]
pub const SPLIT_BETS: [[u8; 2]; 57] = [
    [1, 2], [2, 3], [1, 4], [2, 5], [3, 6],
    [4, 5], [5, 6], [4, 7], [5, 8], [6, 9],
    [7, 8], [8, 9], [7, 10], [8, 11], [9, 12],
    [10, 11], [11, 12], [10, 13], [11, 14], [12, 15],
    [13, 14], [14, 15], [13, 16], [14, 17], [15, 18],
    [16, 17], [17, 18], [16, 19], [17, 20], [18, 21],
    [19, 20], [20, 21], [19, 22], [20, 23], [21, 24],
    [22, 23], [23, 24], [22, 25], [23, 26], [24, 27],
    [25, 26], [26, 27], [25, 28], [26, 29], [27, 30],
    [28, 29], [29, 30], [28, 31], [29, 32], [30, 33],
    [31, 32], [32, 33], [31, 34], [32, 35], [33, 36],
    [34, 35], [35, 36],
];

#[rustfmt::skip]
pub const STREET_BETS: [[u8; 3]; 12] = [
    [1, 2, 3], [4, 5, 6], [7, 8, 9], [10, 11, 12],
    [13, 14, 15], [16, 17, 18], [19, 20, 21], [22, 23, 24],
    [25, 26, 27], [28, 29, 30], [31, 32, 33], [34, 35, 36],
];

#[rustfmt::skip]
pub const CORNER_BETS: [[u8; 4]; 22] = [
    [1, 2, 4, 5], [2, 3, 5, 6], [4, 5, 7, 8], [5, 6, 8, 9],
    [7, 8, 10, 11], [8, 9, 11, 12], [10, 11, 13, 14], [11, 12, 14, 15],
    [13, 14, 16, 17], [14, 15, 17, 18], [16, 17, 19, 20], [17, 18, 20, 21],
    [19, 20, 22, 23], [20, 21, 23, 24], [22, 23, 25, 26], [23, 24, 26, 27],
    [25, 26, 28, 29], [26, 27, 29, 30], [28, 29, 31, 32], [29, 30, 32, 33],
    [31, 32, 34, 35], [32, 33, 35, 36],
];

pub const SIX_LINE_BETS: [[u8; 6]; 11] = [
    [1, 2, 3, 4, 5, 6],
    [4, 5, 6, 7, 8, 9],
    [7, 8, 9, 10, 11, 12],
    [10, 11, 12, 13, 14, 15],
    [13, 14, 15, 16, 17, 18],
    [16, 17, 18, 19, 20, 21],
    [19, 20, 21, 22, 23, 24],
    [22, 23, 24, 25, 26, 27],
    [25, 26, 27, 28, 29, 30],
    [28, 29, 30, 31, 32, 33],
    [31, 32, 33, 34, 35, 36],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Black => "black",
            Color::Green => "green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of `number` on the physical wheel.
pub fn wheel_index(number: u8) -> Option<usize> {
    WHEEL_MAPPING.iter().position(|&n| n == number)
}

/// Color from wheel position parity: zero is green, odd positions red, even positions black.
pub fn color_of(number: u8) -> Option<Color> {
    wheel_index(number).map(|index| match index {
        0 => Color::Green,
        i if i % 2 == 1 => Color::Red,
        _ => Color::Black,
    })
}

/// Color as declared by the game's `is_red` flag. The game reports zero as not red.
pub fn declared_color(number: u8, is_red: bool) -> Color {
    match (number, is_red) {
        (0, _) => Color::Green,
        (_, true) => Color::Red,
        (_, false) => Color::Black,
    }
}

/// Index of the group made of exactly `numbers` (in any order) within `table`.
pub fn table_index<const N: usize>(table: &[[u8; N]], numbers: &[u8]) -> Option<u8> {
    if numbers.len() != N {
        return None;
    }
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    table
        .iter()
        .position(|group| group.as_slice() == sorted.as_slice())
        .and_then(|index| u8::try_from(index).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TABLE_REDS: [u8; 18] = [
        1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
    ];

    #[test]
    fn wheel_holds_each_number_once() {
        let unique: HashSet<u8> = WHEEL_MAPPING.iter().copied().collect();
        assert_eq!(unique.len(), 37);
        assert!((0..=36).all(|n| unique.contains(&n)));
    }

    #[test]
    fn color_is_a_pure_function_of_wheel_position() {
        for number in 0..=36u8 {
            let first = color_of(number);
            assert_eq!(first, color_of(number));
            let index = wheel_index(number).expect("on wheel");
            let expected = if index == 0 {
                Color::Green
            } else if index % 2 == 1 {
                Color::Red
            } else {
                Color::Black
            };
            assert_eq!(first, Some(expected), "number {number}");
        }
        assert_eq!(color_of(37), None);
    }

    #[test]
    fn wheel_parity_matches_the_printed_table() {
        for number in 1..=36u8 {
            let expected = if TABLE_REDS.contains(&number) {
                Color::Red
            } else {
                Color::Black
            };
            assert_eq!(color_of(number), Some(expected), "number {number}");
        }
        assert_eq!(color_of(0), Some(Color::Green));
    }

    // The game derives its `is_red` flag as `index % 2 == 1`; the wheel model must agree with it
    // for every number, otherwise the logged color depends on which source is consulted.
    #[test]
    fn game_red_flag_and_wheel_model_agree_for_all_numbers() {
        for (index, &number) in WHEEL_MAPPING.iter().enumerate() {
            let game_flag = index % 2 == 1;
            let declared = declared_color(number, game_flag);
            assert_eq!(Some(declared), color_of(number), "number {number}");
        }
    }

    #[test]
    fn looks_up_groups_regardless_of_order() {
        assert_eq!(table_index(&SPLIT_BETS, &[2, 1]), Some(0));
        assert_eq!(table_index(&SPLIT_BETS, &[35, 36]), Some(56));
        assert_eq!(table_index(&SPLIT_BETS, &[1, 3]), None);
        assert_eq!(table_index(&STREET_BETS, &[3, 1, 2]), Some(0));
        assert_eq!(table_index(&CORNER_BETS, &[36, 35, 33, 32]), Some(21));
        assert_eq!(table_index(&SIX_LINE_BETS, &[31, 32, 33, 34, 35, 36]), Some(10));
        assert_eq!(table_index(&STREET_BETS, &[1, 2]), None);
    }
}
