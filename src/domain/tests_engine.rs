//! State-machine tests: joining, bidding, doubling, play, settlement,
//! timers, pause and abandonment. All driven through `Match::apply`.

use time::Duration;

use crate::domain::bidding::BidValue;
use crate::domain::cards::{Rank, Suit, DECK_SIZE, HAND_SIZE};
use crate::domain::commands::{CommandKind, EndReason, Event};
use crate::domain::rules::ROUND_POINT_TOTAL;
use crate::domain::state::{
    AnnouncementKind, Match, MatchConfig, MatchStatus, PauseReason, Phase, Team,
};
use crate::domain::test_gens::{active_actor, cmd, now, play_any_legal, playing_match, seated_match};
use crate::errors::domain::DomainError;
use uuid::Uuid;

fn join(m: &mut Match, actor: &str) -> Result<Vec<Event>, DomainError> {
    m.apply(
        &cmd(
            actor,
            CommandKind::AddPlayer {
                display_name: actor.to_string(),
                is_bot: false,
            },
        ),
        now(),
    )
}

#[test]
fn fourth_join_deals_and_opens_bidding() {
    let mut m = Match::new(Uuid::new_v4(), MatchConfig::default(), 1);
    for i in 0..3 {
        join(&mut m, &format!("p{i}")).unwrap();
        assert_eq!(m.phase, Phase::Waiting);
    }
    let events = join(&mut m, "p3").unwrap();
    assert_eq!(m.phase, Phase::Bidding);
    assert_eq!(m.active_seat, m.round_opener);
    assert!(m.turn_deadline.is_some());
    assert!(m.players.iter().all(|p| p.hand.len() == HAND_SIZE));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::GameStarted { .. })));
}

#[test]
fn fifth_join_and_duplicate_join_are_rejected() {
    let mut m = seated_match(1);
    assert!(matches!(
        join(&mut m, "p4"),
        Err(DomainError::Phase(_))
    ));
    let mut waiting = Match::new(Uuid::new_v4(), MatchConfig::default(), 1);
    join(&mut waiting, "p0").unwrap();
    assert!(matches!(
        join(&mut waiting, "p0"),
        Err(DomainError::IllegalContent(_))
    ));
}

#[test]
fn bids_rotate_and_must_escalate() {
    let mut m = seated_match(2);
    let opener = m.active_seat;
    m.apply(
        &cmd(
            &active_actor(&m),
            CommandKind::PlaceBid {
                value: BidValue::Points(90),
                suit: Suit::Spades,
            },
        ),
        now(),
    )
    .unwrap();
    assert_eq!(m.active_seat, (opener + 1) % 4);

    // Equal bid from the next seat is rejected and mutates nothing.
    let version = m.last_saved;
    let err = m
        .apply(
            &cmd(
                &active_actor(&m),
                CommandKind::PlaceBid {
                    value: BidValue::Points(90),
                    suit: Suit::Hearts,
                },
            ),
            now(),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalContent(_)));
    assert_eq!(m.last_saved, version);
    assert_eq!(m.bids.len(), 1);
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let mut m = seated_match(3);
    let wrong = m.player_at((m.active_seat + 1) % 4).unwrap().id.clone();
    let err = m.apply(&cmd(&wrong, CommandKind::Pass), now()).unwrap_err();
    assert!(matches!(err, DomainError::Turn { .. }));
}

#[test]
fn three_passes_lock_the_contract() {
    let m = playing_match(4, Suit::Spades);
    assert_eq!(m.phase, Phase::Playing);
    assert_eq!(m.trump_suit, Some(Suit::Spades));
    let contract = m.contract.unwrap();
    assert_eq!(contract.value, BidValue::Points(80));
    // The bidder leads the first trick.
    assert_eq!(m.active_seat, m.bids[0].seat);
}

#[test]
fn four_passes_without_a_bid_redeal() {
    let mut m = seated_match(5);
    let before: Vec<_> = m.players.iter().map(|p| p.hand.clone()).collect();
    let mut events = Vec::new();
    for _ in 0..4 {
        events = m.apply(&cmd(&active_actor(&m), CommandKind::Pass), now()).unwrap();
    }
    assert!(events.iter().any(|e| matches!(e, Event::Redealt)));
    assert_eq!(m.phase, Phase::Bidding);
    assert_eq!(m.deal_no, 2);
    assert_eq!(m.consecutive_passes, 0);
    let after: Vec<_> = m.players.iter().map(|p| p.hand.clone()).collect();
    assert_ne!(before, after);
    assert!(m.players.iter().all(|p| p.hand.len() == HAND_SIZE));
}

#[test]
fn coinche_locks_the_contract_and_starts_play() {
    let mut m = seated_match(6);
    let bidder = m.active_seat;
    m.apply(
        &cmd(
            &active_actor(&m),
            CommandKind::PlaceBid {
                value: BidValue::Points(100),
                suit: Suit::Diamonds,
            },
        ),
        now(),
    )
    .unwrap();

    // Next seat is on the defending team.
    let defender = m.player_at((bidder + 1) % 4).unwrap().id.clone();
    let events = m.apply(&cmd(&defender, CommandKind::Coinche), now()).unwrap();
    assert!(events.iter().any(|e| matches!(e, Event::Coinched { .. })));
    assert_eq!(m.phase, Phase::Playing);
    assert_eq!(m.trump_suit, Some(Suit::Diamonds));
    assert!(m.contract.unwrap().coinched);

    // The contracting team may answer with a surcoinche before any card.
    let holder = m.player_at(bidder).unwrap().id.clone();
    m.apply(&cmd(&holder, CommandKind::Surcoinche), now()).unwrap();
    assert!(m.contract.unwrap().surcoinched);
}

#[test]
fn coinche_by_the_contract_team_is_rejected() {
    let mut m = seated_match(7);
    let bidder = m.active_seat;
    m.apply(
        &cmd(
            &active_actor(&m),
            CommandKind::PlaceBid {
                value: BidValue::Points(80),
                suit: Suit::Clubs,
            },
        ),
        now(),
    )
    .unwrap();
    let partner = m.player_at((bidder + 2) % 4).unwrap().id.clone();
    let err = m.apply(&cmd(&partner, CommandKind::Coinche), now()).unwrap_err();
    assert!(matches!(err, DomainError::IllegalContent(_)));
}

#[test]
fn surcoinche_after_the_first_card_is_rejected() {
    let mut m = seated_match(8);
    let bidder = m.active_seat;
    m.apply(
        &cmd(
            &active_actor(&m),
            CommandKind::PlaceBid {
                value: BidValue::Points(80),
                suit: Suit::Clubs,
            },
        ),
        now(),
    )
    .unwrap();
    let defender = m.player_at((bidder + 1) % 4).unwrap().id.clone();
    m.apply(&cmd(&defender, CommandKind::Coinche), now()).unwrap();
    play_any_legal(&mut m);

    let holder = m.player_at(bidder).unwrap().id.clone();
    let err = m.apply(&cmd(&holder, CommandKind::Surcoinche), now()).unwrap_err();
    assert!(matches!(err, DomainError::Phase(_)));
}

#[test]
fn off_suit_play_is_rejected_when_the_lead_is_held() {
    let mut m = playing_match(9, Suit::Hearts);
    let mut checked = false;
    for _ in 0..DECK_SIZE - 1 {
        if let Some(lead) = m.lead_suit() {
            let seat = m.active_seat;
            let hand = m.player_at(seat).unwrap().hand.clone();
            let has_lead = hand.iter().any(|c| c.suit == lead);
            if has_lead {
                if let Some(&off) = hand.iter().find(|c| c.suit != lead) {
                    let err = m
                        .apply(
                            &cmd(&active_actor(&m), CommandKind::PlayCard { card: off }),
                            now(),
                        )
                        .unwrap_err();
                    assert!(matches!(err, DomainError::IllegalContent(_)));
                    checked = true;
                }
            }
        }
        play_any_legal(&mut m);
        if m.phase != Phase::Playing {
            break;
        }
    }
    assert!(checked, "no position with a followable lead came up");
}

#[test]
fn belote_then_rebelote_once_each() {
    // Find a deal where someone holds both trump honours.
    let (mut m, seat) = (0..200)
        .find_map(|seed| {
            let m = playing_match(seed, Suit::Hearts);
            let seat = m.players.iter().find(|p| {
                p.hand
                    .iter()
                    .any(|c| c.suit == Suit::Hearts && c.rank == Rank::Queen)
                    && p
                        .hand
                        .iter()
                        .any(|c| c.suit == Suit::Hearts && c.rank == Rank::King)
            })?;
            let seat = seat.seat;
            Some((m, seat))
        })
        .unwrap();

    let holder = m.player_at(seat).unwrap().id.clone();
    let events = m
        .apply(
            &cmd(
                &holder,
                CommandKind::DeclareAnnouncement {
                    kind: AnnouncementKind::Belote,
                },
            ),
            now(),
        )
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::AnnouncementMade { .. })));
    assert!(m.last_announcement.is_some());

    let err = m
        .apply(
            &cmd(
                &holder,
                CommandKind::DeclareAnnouncement {
                    kind: AnnouncementKind::Belote,
                },
            ),
            now(),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalContent(_)));

    m.apply(
        &cmd(
            &holder,
            CommandKind::DeclareAnnouncement {
                kind: AnnouncementKind::Rebelote,
            },
        ),
        now(),
    )
    .unwrap();
    assert_eq!(m.player_at(seat).unwrap().announcements.len(), 2);
}

#[test]
fn full_round_settles_and_redeals() {
    let mut m = seated_match(10);
    m.apply(
        &cmd(
            &active_actor(&m),
            CommandKind::PlaceBid {
                value: BidValue::Points(90),
                suit: Suit::Spades,
            },
        ),
        now(),
    )
    .unwrap();
    for _ in 0..3 {
        m.apply(&cmd(&active_actor(&m), CommandKind::Pass), now()).unwrap();
    }
    assert_eq!(m.phase, Phase::Playing);
    assert_eq!(m.trump_suit, Some(Suit::Spades));
    let contract_team = m.contract.unwrap().team;

    let mut settled = None;
    for _ in 0..DECK_SIZE {
        let events = play_any_legal(&mut m);
        if let Some(e) = events
            .iter()
            .find(|e| matches!(e, Event::RoundSettled { .. }))
        {
            settled = Some(e.clone());
            break;
        }
    }
    let Some(Event::RoundSettled {
        contract_team: team,
        trick_points,
        delta,
        made,
        ..
    }) = settled
    else {
        panic!("round did not settle");
    };
    assert_eq!(team, contract_team);
    assert!(trick_points <= ROUND_POINT_TOTAL);
    if made {
        assert_eq!(delta, trick_points as i32);
        assert!(trick_points >= 90);
    } else {
        assert_eq!(delta, -90);
    }
    assert_eq!(m.scores.get(contract_team), delta);

    // A new round is already dealt.
    assert_eq!(m.phase, Phase::Bidding);
    assert_eq!(m.deal_no, 2);
    assert!(m.tricks.is_empty() && m.contract.is_none() && m.trump_suit.is_none());
    assert_eq!(m.active_seat, m.round_opener);
    assert!(m.players.iter().all(|p| p.hand.len() == HAND_SIZE));
}

#[test]
fn reaching_the_target_score_ends_the_match() {
    let mut m = seated_match(11);
    m.config.target_score = Some(1);
    m.scores.add(Team::A, 500);
    m.apply(
        &cmd(
            &active_actor(&m),
            CommandKind::PlaceBid {
                value: BidValue::Points(80),
                suit: Suit::Clubs,
            },
        ),
        now(),
    )
    .unwrap();
    for _ in 0..3 {
        m.apply(&cmd(&active_actor(&m), CommandKind::Pass), now()).unwrap();
    }

    let mut ended = false;
    for _ in 0..DECK_SIZE {
        let events = play_any_legal(&mut m);
        if events.iter().any(|e| {
            matches!(
                e,
                Event::MatchEnded {
                    reason: EndReason::TargetScoreReached,
                    ..
                }
            )
        }) {
            ended = true;
            break;
        }
    }
    assert!(ended);
    assert_eq!(m.phase, Phase::Ended);
    assert!(m.turn_deadline.is_none());
}

#[test]
fn expired_deadline_forces_exactly_one_action() {
    let mut m = seated_match(12);
    let opener = m.active_seat;
    m.turn_deadline = Some(now() - Duration::seconds(1));

    let events = m.apply(&cmd("ticker", CommandKind::Tick), now()).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::TurnTimedOut { .. })));
    assert!(events.iter().any(|e| matches!(e, Event::Passed { .. })));
    assert_eq!(m.consecutive_passes, 1);
    assert_eq!(m.active_seat, (opener + 1) % 4);

    // Deadline was re-armed by the forced pass, so a second tick is a no-op.
    let version = m.last_saved;
    let events = m.apply(&cmd("ticker", CommandKind::Tick), now()).unwrap();
    assert!(events.is_empty());
    assert_eq!(m.consecutive_passes, 1);
    assert_eq!(m.last_saved, version);
}

#[test]
fn expired_deadline_during_play_forces_a_legal_card() {
    let mut m = playing_match(13, Suit::Clubs);
    let seat = m.active_seat;
    let hand_before = m.player_at(seat).unwrap().hand.len();
    m.turn_deadline = Some(now() - Duration::seconds(1));

    let events = m.apply(&cmd("ticker", CommandKind::Tick), now()).unwrap();
    assert!(events.iter().any(|e| matches!(e, Event::CardPlayed { .. })));
    assert_eq!(m.player_at(seat).unwrap().hand.len(), hand_before - 1);
    assert_eq!(m.current_trick.len(), 1);
}

#[test]
fn disconnection_pauses_and_reconnection_resumes() {
    let mut m = seated_match(14);
    let events = m.apply(&cmd("p2", CommandKind::Disconnect), now()).unwrap();
    assert_eq!(m.status, MatchStatus::Paused);
    assert!(matches!(
        m.pause_reason,
        Some(PauseReason::Disconnection { ref seats }) if seats == &vec![2]
    ));
    assert!(events.iter().any(|e| matches!(e, Event::GamePaused { .. })));

    // Paused matches ignore the clock.
    m.turn_deadline = Some(now() - Duration::seconds(1));
    let events = m.apply(&cmd("ticker", CommandKind::Tick), now()).unwrap();
    assert!(events.is_empty());

    let events = m.apply(&cmd("p2", CommandKind::Reconnect), now()).unwrap();
    assert_eq!(m.status, MatchStatus::Active);
    assert!(m.pause_reason.is_none());
    assert!(events.iter().any(|e| matches!(e, Event::GameResumed)));
}

#[test]
fn bot_disconnection_does_not_pause() {
    let mut m = Match::new(Uuid::new_v4(), MatchConfig::default(), 15);
    for i in 0..4 {
        m.apply(
            &cmd(
                &format!("p{i}"),
                CommandKind::AddPlayer {
                    display_name: format!("p{i}"),
                    is_bot: i == 3,
                },
            ),
            now(),
        )
        .unwrap();
    }
    m.apply(&cmd("p3", CommandKind::Disconnect), now()).unwrap();
    assert_eq!(m.status, MatchStatus::Active);
}

#[test]
fn abandoning_forfeits_to_the_other_team() {
    let mut m = seated_match(16);
    let events = m.apply(&cmd("p1", CommandKind::Abandon), now()).unwrap();
    assert_eq!(m.phase, Phase::Ended);
    assert_eq!(m.status, MatchStatus::Abandoned);
    assert!(m.player_at(1).unwrap().has_abandoned);
    assert!(events.iter().any(|e| {
        matches!(
            e,
            Event::MatchEnded {
                winner: Some(Team::A),
                reason: EndReason::Abandoned { seat: 1 },
                ..
            }
        )
    }));

    let err = m.apply(&cmd("p0", CommandKind::Abandon), now()).unwrap_err();
    assert!(matches!(err, DomainError::Phase(_)));
}

#[test]
fn every_accepted_command_bumps_the_version() {
    let mut m = seated_match(17);
    let v0 = m.last_saved;
    m.apply(&cmd(&active_actor(&m), CommandKind::Pass), now()).unwrap();
    assert_eq!(m.last_saved, v0 + 1);
}
