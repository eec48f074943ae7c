//! Concrete rule cases: orderings, trick winners, bid legality, belote
//! eligibility and contract settlement.

use time::OffsetDateTime;

use crate::domain::bidding::BidValue;
use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::rules::{
    can_declare_belote, can_declare_rebelote, is_legal_bid, legal_bid_values, settle_contract,
    trick_points, trick_winner,
};
use crate::domain::state::{AnnouncementKind, Announcement, Player, Team};

fn card(suit: Suit, rank: Rank) -> Card {
    Card { suit, rank }
}

fn player_with(hand: Vec<Card>) -> Player {
    Player {
        id: "p0".into(),
        display_name: "p0".into(),
        seat: 0,
        team: Team::A,
        hand,
        connected: true,
        is_bot: false,
        has_abandoned: false,
        announcements: Vec::new(),
    }
}

#[test]
fn lone_trump_takes_the_trick() {
    let trick = [
        card(Suit::Spades, Rank::Ten),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Spades, Rank::King),
        card(Suit::Spades, Rank::Queen),
    ];
    assert_eq!(trick_winner(&trick, Suit::Clubs), 1);
}

#[test]
fn highest_of_led_suit_wins_without_trumps() {
    let trick = [
        card(Suit::Spades, Rank::Ten),
        card(Suit::Spades, Rank::King),
        card(Suit::Spades, Rank::Ace),
        card(Suit::Spades, Rank::Queen),
    ];
    assert_eq!(trick_winner(&trick, Suit::Clubs), 2);
}

#[test]
fn trump_nine_beats_trump_king() {
    let trick = [
        card(Suit::Hearts, Rank::King),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Hearts, Rank::Seven),
    ];
    assert_eq!(trick_winner(&trick, Suit::Hearts), 1);
}

#[test]
fn bid_legality_cases() {
    let over_80 = Some(BidValue::Points(80));
    assert!(is_legal_bid(BidValue::Points(90), over_80));
    assert!(!is_legal_bid(BidValue::Points(85), over_80));
    assert!(!is_legal_bid(BidValue::Points(80), Some(BidValue::Points(90))));
    assert!(!is_legal_bid(BidValue::Points(170), Some(BidValue::Points(160))));
    assert!(is_legal_bid(BidValue::Capot, Some(BidValue::Points(160))));
    assert!(!is_legal_bid(BidValue::Points(160), Some(BidValue::Capot)));
    assert!(!is_legal_bid(BidValue::Capot, Some(BidValue::Capot)));
}

#[test]
fn legal_bid_values_shrink_as_the_contract_rises() {
    let fresh = legal_bid_values(None);
    assert_eq!(fresh.len(), 10); // 80..=160 plus capot
    assert_eq!(fresh[0], BidValue::Points(80));
    assert_eq!(*fresh.last().unwrap(), BidValue::Capot);

    let over_150 = legal_bid_values(Some(BidValue::Points(150)));
    assert_eq!(over_150, vec![BidValue::Points(160), BidValue::Capot]);
    assert!(legal_bid_values(Some(BidValue::Capot)).is_empty());
}

#[test]
fn made_contract_credits_trick_points() {
    assert_eq!(settle_contract(110, 100, 1), 110);
}

#[test]
fn failed_doubled_contract_debits_twice_the_contract() {
    assert_eq!(settle_contract(90, 100, 2), -200);
}

#[test]
fn surcoinche_quadruples() {
    assert_eq!(settle_contract(90, 100, 4), -400);
    assert_eq!(settle_contract(110, 100, 4), 440);
}

#[test]
fn trick_points_count_announcement_bonuses() {
    let trick = [
        card(Suit::Spades, Rank::Jack),
        card(Suit::Spades, Rank::Nine),
        card(Suit::Hearts, Rank::Seven),
        card(Suit::Hearts, Rank::Eight),
    ];
    // Trump jack 20 + trump nine 14.
    assert_eq!(trick_points(&trick, Suit::Spades, 0), 34);
    assert_eq!(trick_points(&trick, Suit::Spades, 1), 54);
}

#[test]
fn belote_needs_both_trump_honours() {
    let both = player_with(vec![
        card(Suit::Hearts, Rank::Queen),
        card(Suit::Hearts, Rank::King),
    ]);
    assert!(can_declare_belote(&both, Suit::Hearts));
    assert!(!can_declare_belote(&both, Suit::Spades));

    let queen_only = player_with(vec![card(Suit::Hearts, Rank::Queen)]);
    assert!(!can_declare_belote(&queen_only, Suit::Hearts));
}

#[test]
fn rebelote_requires_a_prior_belote() {
    let mut p = player_with(vec![
        card(Suit::Hearts, Rank::Queen),
        card(Suit::Hearts, Rank::King),
    ]);
    assert!(!can_declare_rebelote(&p, Suit::Hearts));

    p.announcements.push(Announcement {
        kind: AnnouncementKind::Belote,
        seat: 0,
        at: OffsetDateTime::now_utc(),
    });
    assert!(can_declare_rebelote(&p, Suit::Hearts));
    assert!(!can_declare_belote(&p, Suit::Hearts));

    p.announcements.push(Announcement {
        kind: AnnouncementKind::Rebelote,
        seat: 0,
        at: OffsetDateTime::now_utc(),
    });
    assert!(!can_declare_rebelote(&p, Suit::Hearts));
}
