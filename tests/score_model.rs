//! Score model: sub-score shapes and the constraint check.

use std::collections::HashMap;

use badminton_court_scheduler::logic::score::{
    balance_score, diversity_score, gender_score, score_candidate, skill_score, time_score,
};
use badminton_court_scheduler::logic::ProjectedState;
use badminton_court_scheduler::{Gender, Player, SessionSettings, Timestamp};
use chrono::{Duration, TimeZone, Utc};

fn at(minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 4, 18, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn player(username: &str, skill: u8) -> Player {
    Player::new(username.to_uppercase(), username, skill, at(0))
}

fn waiting_since(minutes: i64) -> ProjectedState {
    ProjectedState {
        next_available: at(minutes),
        committed_until: None,
        last_partnered: HashMap::new(),
        times_partnered: HashMap::new(),
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn time_score_grows_with_wait_then_caps() {
    let settings = SessionSettings::default(); // 30 minute cap
    let state = waiting_since(0);
    let mut previous = 0.0;
    for minute in 0..=60 {
        let score = time_score(&state, at(minute), &settings);
        assert!(score >= previous, "score dropped at minute {minute}");
        if minute >= 30 {
            assert!(close(score, 1.0));
        }
        previous = score;
    }
    assert!(close(time_score(&state, at(15), &settings), 0.5));
}

#[test]
fn time_score_is_zero_while_still_on_court() {
    let settings = SessionSettings::default();
    let mut state = waiting_since(-40);
    state.committed_until = Some(at(5));
    assert_eq!(time_score(&state, at(4), &settings), 0.0);
    assert!(!state.is_available_at(at(4)));
    // the court has ended by the time a game starting at 5 begins
    assert!(time_score(&state, at(5), &settings) > 0.0);
    assert!(state.is_available_at(at(5)));
}

#[test]
fn time_score_is_zero_before_projected_availability() {
    let settings = SessionSettings::default();
    let state = waiting_since(10);
    assert_eq!(time_score(&state, at(4), &settings), 0.0);
}

#[test]
fn diversity_rewards_new_partners() {
    let settings = SessionSettings::default(); // 60 minute wait cap, count cap 3
    let mate = player("bo", 3);
    let chosen = [Some(&mate)];

    let fresh = waiting_since(0);
    assert!(close(diversity_score(&fresh, &chosen, at(10), &settings), 1.0));

    let mut worn_out = waiting_since(0);
    worn_out.last_partnered.insert("bo".into(), at(10));
    worn_out.times_partnered.insert("bo".into(), 5);
    assert!(close(diversity_score(&worn_out, &chosen, at(10), &settings), 0.0));

    let mut halfway = waiting_since(0);
    halfway.last_partnered.insert("bo".into(), at(-20));
    halfway.times_partnered.insert("bo".into(), 3);
    // delay 30/60 = 0.5, count 0 -> 0.25
    assert!(close(diversity_score(&halfway, &chosen, at(10), &settings), 0.25));
}

#[test]
fn diversity_averages_over_chosen_and_ignores_unknown() {
    let settings = SessionSettings::default();
    let a = player("a", 3);
    let b = player("b", 3);
    let mut state = waiting_since(0);
    state.last_partnered.insert("a".into(), at(10));
    state.times_partnered.insert("a".into(), 3);
    // a scores 0, b scores 1, the unknown slot is skipped.
    let chosen = [Some(&a), Some(&b), None];
    assert!(close(diversity_score(&state, &chosen, at(10), &settings), 0.5));
    assert_eq!(diversity_score(&state, &[], at(10), &settings), 0.0);
}

#[test]
fn balance_is_inactive_until_two_are_chosen() {
    let settings = SessionSettings::default();
    let a = player("a", 3);
    assert_eq!(balance_score(&player("c", 3), &[], &settings), None);
    assert_eq!(balance_score(&player("c", 3), &[Some(&a)], &settings), None);
}

#[test]
fn balance_targets_opposing_first_pick_then_team_totals() {
    let settings = SessionSettings::default(); // team variance 1
    let a1 = player("a1", 3);
    let b1 = player("b1", 5);
    let two = [Some(&a1), Some(&b1)];
    assert_eq!(balance_score(&player("x", 5), &two, &settings), Some(1.0));
    assert_eq!(balance_score(&player("x", 6), &two, &settings), Some(0.5));
    assert_eq!(balance_score(&player("x", 7), &two, &settings), Some(0.0));

    let a2 = player("a2", 4);
    let three = [Some(&a1), Some(&b1), Some(&a2)];
    // team A totals 7, so team B's second needs 2
    assert_eq!(balance_score(&player("x", 2), &three, &settings), Some(1.0));
    assert_eq!(balance_score(&player("x", 3), &three, &settings), Some(0.5));

    let with_unknown = [Some(&a1), None];
    assert_eq!(balance_score(&player("x", 5), &with_unknown, &settings), None);
}

#[test]
fn skill_measures_the_widest_gap() {
    let settings = SessionSettings::default(); // individual variance 2
    let a = player("a", 3);
    let b = player("b", 5);
    let chosen = [Some(&a), Some(&b)];
    let middle = skill_score(&player("x", 4), &chosen, &settings).unwrap();
    assert!(close(middle, 2.0 / 3.0));
    // close to b but three away from a
    assert_eq!(skill_score(&player("x", 6), &chosen, &settings), Some(0.0));
    assert_eq!(skill_score(&player("x", 6), &[], &settings), None);
}

#[test]
fn gender_is_agnostic_when_first_picks_match() {
    let a = player("a", 3).with_gender(Gender::Male);
    let b = player("b", 3).with_gender(Gender::Male);
    let f = player("f", 3).with_gender(Gender::Female);
    let m = player("m", 3).with_gender(Gender::Male);
    assert_eq!(gender_score(&f, &[Some(&a), Some(&b)]), 0.0);
    assert_eq!(gender_score(&m, &[Some(&a), Some(&b)]), 0.0);
    assert_eq!(gender_score(&f, &[Some(&a)]), 0.0);
}

#[test]
fn gender_completes_mixed_or_same_gender_pattern() {
    let a1 = player("a1", 3).with_gender(Gender::Male);
    let b1 = player("b1", 3).with_gender(Gender::Female);
    let male = player("m", 3).with_gender(Gender::Male);
    let female = player("f", 3).with_gender(Gender::Female);
    let unset = player("u", 3);

    // Second pick for team A mirrors team B's first pick.
    assert_eq!(gender_score(&female, &[Some(&a1), Some(&b1)]), 1.0);
    assert_eq!(gender_score(&male, &[Some(&a1), Some(&b1)]), 0.0);

    // Team A is two men, so team B should be two women.
    let a2_male = player("a2", 3).with_gender(Gender::Male);
    let same = [Some(&a1), Some(&b1), Some(&a2_male)];
    assert_eq!(gender_score(&female, &same), 1.0);
    assert_eq!(gender_score(&male, &same), 0.0);

    // Team A is mixed, so team B should be mixed too.
    let a2_female = player("a2", 3).with_gender(Gender::Female);
    let mixed = [Some(&a1), Some(&b1), Some(&a2_female)];
    assert_eq!(gender_score(&male, &mixed), 1.0);
    assert_eq!(gender_score(&female, &mixed), 0.0);

    assert_eq!(gender_score(&unset, &mixed), 0.0);
}

#[test]
fn breakdown_total_and_constraints() {
    let settings = SessionSettings::default();
    let a1 = player("a1", 3);
    let b1 = player("b1", 3);
    let chosen = [Some(&a1), Some(&b1)];
    let state = waiting_since(-30);

    let good = score_candidate(&player("x", 3), &state, &chosen, at(0), &settings);
    assert!(good.satisfies_constraints());
    // time 1 + diversity 0.5*1 + balance 0.5*1 + skill 0.5*1 + gender 0
    assert!(close(good.total(&settings.weights), 2.5));

    let far = score_candidate(&player("y", 8), &state, &chosen, at(0), &settings);
    assert!(!far.satisfies_constraints());

    let first_pick = score_candidate(&player("z", 8), &state, &[], at(0), &settings);
    assert!(first_pick.satisfies_constraints());
}
