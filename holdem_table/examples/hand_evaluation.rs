//! Hand Evaluation Example
//!
//! Demonstrates ranking hands with the `StandardEvaluator` and plugging a
//! custom comparator into a table.

use holdem_table::{
    HandEvaluator, HandStrength, StandardEvaluator, Table, TableConfig, TimerEvent,
    game::{Card, HandCategory, Suit},
};

fn show(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
}

fn main() {
    println!("=== Hold'em Hand Evaluation Example ===\n");

    // Example 1: Best five of seven cards
    println!("Example 1: Evaluating a 7-card hand");
    let royal = [
        Card(14, Suit::Heart),
        Card(13, Suit::Heart),
        Card(12, Suit::Heart),
        Card(11, Suit::Heart),
        Card(10, Suit::Heart),
        Card(9, Suit::Spade),
        Card(2, Suit::Club),
    ];
    let strength = StandardEvaluator.evaluate(&royal);
    println!("Hand: {}", show(&royal));
    println!("Strength: {} {:?}\n", strength.category, strength.values);

    // Example 2: Compare two hands
    println!("Example 2: Comparing two hands");
    let aces = [
        Card(14, Suit::Spade),
        Card(14, Suit::Heart),
        Card(10, Suit::Club),
        Card(9, Suit::Diamond),
        Card(2, Suit::Spade),
    ];
    let kings = [
        Card(13, Suit::Spade),
        Card(13, Suit::Heart),
        Card(10, Suit::Club),
        Card(9, Suit::Diamond),
        Card(2, Suit::Spade),
    ];
    let (a, b) = (
        StandardEvaluator.evaluate(&aces),
        StandardEvaluator.evaluate(&kings),
    );
    println!("Hand A: {}", show(&aces));
    println!("Hand B: {}", show(&kings));
    match a.cmp(&b) {
        std::cmp::Ordering::Greater => println!("Winner: Hand A"),
        std::cmp::Ordering::Less => println!("Winner: Hand B"),
        std::cmp::Ordering::Equal => println!("Tie!"),
    }

    // Example 3: A table with a custom comparator where every hand ties
    println!("\nExample 3: Splitting a pot with a custom comparator");
    let always_tie = |_: &[Card]| HandStrength::new(HandCategory::HighCard, [0; 5]);
    let Ok(mut table) = Table::with_evaluator(TableConfig::default(), always_tie) else {
        return;
    };
    let alice = table.add_player("alice", 1000);
    let bob = table.add_player("bob", 1000);
    let (Ok(alice), Ok(bob)) = (alice, bob) else {
        return;
    };
    if table.new_game().is_err() || table.call(bob).is_err() {
        return;
    }
    while let Some(id) = table.current_player() {
        if table.check(id).is_err() {
            break;
        }
    }
    table.fire(TimerEvent::EndGame { hand: 1 });
    for id in [alice, bob] {
        if let Some(player) = table.player(id) {
            println!("{}: {} chips", player.name, player.chips);
        }
    }
}
