//! Queue generation: plan shape, eligibility, projection and determinism.

use std::collections::HashSet;

use badminton_court_scheduler::{
    generate_queue, Court, Gender, Player, SessionSettings, Side, Timestamp,
};
use chrono::{Duration, TimeZone, Utc};

fn at(minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 4, 18, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// `n` players; player i started waiting at minute i, so p0 has waited longest.
fn roster(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| Player::new(format!("Player {i}"), format!("p{i}"), 3, at(i as i64)))
        .collect()
}

fn put_on_court(players: &mut [Player], usernames: &[&str]) {
    for p in players.iter_mut() {
        if usernames.contains(&p.username.as_str()) {
            p.playing = true;
        }
    }
}

fn names(usernames: &[&str]) -> Vec<String> {
    usernames.iter().map(|u| u.to_string()).collect()
}

fn sorted(court: &Court) -> Vec<String> {
    let mut players = court.players.clone();
    players.sort();
    players
}

#[test]
fn four_players_one_court_fill_one_game() {
    let players = roster(4);
    let courts = vec![Court::new(0, Vec::new(), at(60))];
    let plan = generate_queue(&players, &courts, 1, &SessionSettings::default(), at(60));

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].players.len(), 4);
    assert_eq!(sorted(&plan[0]), names(&["p0", "p1", "p2", "p3"]));
    assert_eq!(plan[0].start_time, Some(at(60)));
}

#[test]
fn four_players_already_on_the_only_court_are_planned_again() {
    let mut players = roster(4);
    put_on_court(&mut players, &["p0", "p1", "p2", "p3"]);
    let courts = vec![Court::new(7, names(&["p0", "p1", "p2", "p3"]), at(60))];
    let plan = generate_queue(&players, &courts, 1, &SessionSettings::default(), at(60));

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].id, 7);
    assert_eq!(sorted(&plan[0]), names(&["p0", "p1", "p2", "p3"]));
    // starts when the current game is expected to end
    assert_eq!(plan[0].start_time, Some(at(68)));
}

#[test]
fn three_players_give_an_empty_plan() {
    let players = roster(3);
    let courts = vec![Court::empty(0)];
    assert!(generate_queue(&players, &courts, 4, &SessionSettings::default(), at(60)).is_empty());
}

#[test]
fn disabled_players_do_not_count() {
    let mut players = roster(4);
    players[2].enabled = false;
    let courts = vec![Court::empty(0)];
    assert!(generate_queue(&players, &courts, 1, &SessionSettings::default(), at(60)).is_empty());
}

#[test]
fn no_courts_give_an_empty_plan() {
    let players = roster(8);
    assert!(generate_queue(&players, &[], 2, &SessionSettings::default(), at(60)).is_empty());
}

#[test]
fn every_planned_court_has_four_distinct_enabled_players() {
    let mut players = roster(11);
    players[5].enabled = false;
    let courts = vec![Court::empty(0), Court::empty(1), Court::empty(2)];
    let plan = generate_queue(&players, &courts, 9, &SessionSettings::default(), at(60));

    assert_eq!(plan.len(), 9);
    let enabled: HashSet<&str> = players
        .iter()
        .filter(|p| p.enabled)
        .map(|p| p.username.as_str())
        .collect();
    for court in &plan {
        let distinct: HashSet<&str> = court.players.iter().map(String::as_str).collect();
        assert_eq!(distinct.len(), 4, "duplicate player in {:?}", court.players);
        assert!(distinct.is_subset(&enabled));
    }
}

#[test]
fn longest_waiting_player_leads_the_head_court() {
    let players = roster(10);
    let courts = vec![Court::empty(0), Court::empty(1)];
    let plan = generate_queue(&players, &courts, 2, &SessionSettings::default(), at(60));
    assert_eq!(plan[0].players[0], "p0");
}

#[test]
fn one_round_uses_each_player_at_most_once() {
    let players = roster(12);
    let courts = vec![Court::empty(0), Court::empty(1), Court::empty(2)];
    let plan = generate_queue(&players, &courts, 3, &SessionSettings::default(), at(60));

    let all: Vec<&String> = plan.iter().flat_map(|c| c.players.iter()).collect();
    let distinct: HashSet<&String> = all.iter().copied().collect();
    assert_eq!(all.len(), 12);
    assert_eq!(distinct.len(), 12);
}

#[test]
fn players_on_court_stay_out_of_the_head_court() {
    let mut players = roster(16);
    let busy = [
        ["p4", "p5", "p6", "p7"],
        ["p8", "p9", "p10", "p11"],
        ["p12", "p13", "p14", "p15"],
    ];
    for court in &busy {
        put_on_court(&mut players, court);
    }
    let courts = vec![
        Court::new(0, names(&busy[0]), at(55)),
        Court::new(1, names(&busy[1]), at(57)),
        Court::new(2, names(&busy[2]), at(58)),
    ];
    let plan = generate_queue(&players, &courts, 3, &SessionSettings::default(), at(60));

    assert_eq!(sorted(&plan[0]), names(&["p0", "p1", "p2", "p3"]));
    // court 0 started first, so it frees first
    assert_eq!(plan[0].id, 0);
    assert_eq!(plan[0].start_time, Some(at(63)));
}

#[test]
fn head_court_waits_for_players_to_come_off_court() {
    let mut players = roster(7);
    let busy = ["p3", "p4", "p5", "p6"];
    put_on_court(&mut players, &busy);
    let courts = vec![Court::new(0, names(&busy), at(60)), Court::empty(1)];
    let plan = generate_queue(&players, &courts, 2, &SessionSettings::default(), at(60));

    assert_eq!(plan.len(), 2);
    // only three players are free until court 0 ends at 68
    assert_eq!(plan[0].id, 1);
    assert_eq!(plan[0].start_time, Some(at(68)));
    for court in &plan {
        if busy.iter().any(|u| court.contains(u)) {
            assert!(court.start_time >= Some(at(68)), "{:?} starts too early", court);
        }
    }
}

#[test]
fn playing_flag_counts_even_without_a_listed_court() {
    let mut players = roster(5);
    players[0].playing = true;
    let courts = vec![Court::empty(0)];
    let plan = generate_queue(&players, &courts, 1, &SessionSettings::default(), at(60));

    assert_eq!(plan[0].start_time, Some(at(60)));
    assert!(!plan[0].contains("p0"));
    assert_eq!(sorted(&plan[0]), names(&["p1", "p2", "p3", "p4"]));
}

#[test]
fn planned_courts_follow_the_court_rotation() {
    let mut players = roster(12);
    put_on_court(&mut players, &["p8", "p9", "p10", "p11"]);
    let courts = vec![
        Court::new(0, names(&["p8", "p9", "p10", "p11"]), at(58)),
        Court::empty(1),
    ];
    let plan = generate_queue(&players, &courts, 4, &SessionSettings::default(), at(60));

    let ids: Vec<u32> = plan.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 0, 1, 0]);
    let starts: Vec<Timestamp> = plan.iter().filter_map(|c| c.start_time).collect();
    assert_eq!(starts, vec![at(60), at(66), at(68), at(74)]);
}

#[test]
fn skill_bound_filters_candidates_when_possible() {
    let skills = [1, 8, 1, 8, 1, 1];
    let players: Vec<Player> = skills
        .iter()
        .enumerate()
        .map(|(i, &s)| Player::new(format!("Player {i}"), format!("p{i}"), s, at(i as i64 - 60)))
        .collect();
    let courts = vec![Court::empty(0)];
    let plan = generate_queue(&players, &courts, 1, &SessionSettings::default(), at(60));

    assert_eq!(plan[0].players, names(&["p0", "p2", "p4", "p5"]));
    assert_eq!(plan[0].team(Side::A), vec!["p0", "p4"]);
    assert_eq!(plan[0].team(Side::B), vec!["p2", "p5"]);
}

#[test]
fn impossible_skill_bound_still_fills_the_court() {
    let skills = [1, 8, 1, 8];
    let players: Vec<Player> = skills
        .iter()
        .enumerate()
        .map(|(i, &s)| Player::new(format!("Player {i}"), format!("p{i}"), s, at(i as i64)))
        .collect();
    let courts = vec![Court::empty(0)];
    let plan = generate_queue(&players, &courts, 1, &SessionSettings::default(), at(60));

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].players.len(), 4);
}

#[test]
fn unknown_usernames_on_courts_are_tolerated() {
    let players = roster(8);
    let courts = vec![
        Court::new(0, names(&["ghost", "p1", "p2", "p3"]), at(55)),
        Court::empty(1),
    ];
    let plan = generate_queue(&players, &courts, 2, &SessionSettings::default(), at(60));
    assert_eq!(plan.len(), 2);
    assert!(plan.iter().all(|c| !c.contains("ghost")));
}

fn varied_session() -> (Vec<Player>, Vec<Court>) {
    let mut players: Vec<Player> = (0..10)
        .map(|i| {
            let gender = if i % 2 == 0 { Gender::Male } else { Gender::Female };
            Player::new(format!("Player {i}"), format!("p{i}"), (i % 5 + 1) as u8, at(-(i as i64) * 3))
                .with_gender(gender)
        })
        .collect();
    players[0].last_partnered.insert("p1".into(), at(-5));
    players[0].times_partnered.insert("p1".into(), 2);
    players[1].last_partnered.insert("p0".into(), at(-5));
    players[1].times_partnered.insert("p0".into(), 2);
    put_on_court(&mut players, &["p6", "p7", "p8", "p9"]);
    let courts = vec![
        Court::new(0, names(&["p6", "p7", "p8", "p9"]), at(-3)),
        Court::empty(1),
    ];
    (players, courts)
}

#[test]
fn identical_inputs_give_identical_plans() {
    let (players, courts) = varied_session();
    let settings = SessionSettings::default();
    let first = generate_queue(&players, &courts, 6, &settings, at(0));
    let second = generate_queue(&players, &courts, 6, &settings, at(0));
    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
}

#[test]
fn planning_does_not_touch_committed_state() {
    let (players, courts) = varied_session();
    let before = players.clone();
    let _ = generate_queue(&players, &courts, 6, &SessionSettings::default(), at(0));
    assert_eq!(players, before);
}
