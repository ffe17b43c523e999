//! End-to-end lifecycle tests: whole proposal/treasury flows assembled into
//! atomic batches and validated the way the ledger would.

use covenant_coinset::{singleton_spend, Coin, CoinSpend, LineageProof, SpendBatch};
use covenant_conditions::Condition;
use covenant_crypto::{coin_announcement_id, puzzle_announcement_id};
use covenant_governance::{
    CloseOp, FinishedPuzzle, FundingPuzzle, FundingSolution, GovernanceError, LockupClass,
    LockupPuzzle, LockupSolution, PayloadKind, ProposalClass, ProposalInfo, ProposalPuzzle,
    ProposalSolution, ProposedPayload, SpendPayload, TimerSolution, TreasuryPuzzle,
    TreasurySolution, UpdatePayload, ValidatorConfig, VoteCast, VoteDirection, VoteOp, VoteTally,
};
use covenant_types::{Amount, CoinId, DaoRules, LauncherId, PuzzleHash};

/// Everything one DAO needs, wired together the way a wallet would.
struct Dao {
    rules: DaoRules,
    lockup_class: LockupClass,
    proposal_class: ProposalClass,
    validator: ValidatorConfig,
    treasury: TreasuryPuzzle,
    funding: FundingPuzzle,
}

fn dao() -> Dao {
    let treasury_id = LauncherId::new([0x7E; 32]);
    let rules = DaoRules {
        proposal_timelock: 40,
        soft_close_length: 5,
        attendance_required: Amount::new(1000),
        pass_margin_bps: 5100,
        self_destruct_time: 1000,
        oracle_spend_delay: 10,
    };
    let lockup_class = LockupClass::new(PuzzleHash::new([0xAA; 32]));
    let proposal_class = ProposalClass {
        treasury_id,
        lockup_class_hash: lockup_class.class_hash(),
        token_class_hash: PuzzleHash::new([0xAA; 32]),
    };
    let validator = ValidatorConfig {
        treasury_id,
        proposal_class_hash: proposal_class.class_hash(),
        minimum_proposal_amount: Amount::new(1),
        excess_puzzle_hash: PuzzleHash::new([0x31; 32]),
    };
    let treasury = TreasuryPuzzle::new(treasury_id, validator.clone(), rules);
    let funding = FundingPuzzle::new(treasury_id);
    Dao {
        rules,
        lockup_class,
        proposal_class,
        validator,
        treasury,
        funding,
    }
}

fn proposal_id() -> LauncherId {
    LauncherId::new([0x50; 32])
}

/// A proposal launched with zero tallies receiving one yes-vote of weight 10
/// recreates itself as (10, 10), creates its timer, and the lockup/proposal
/// announcement pair matches inside one batch.
#[test]
fn first_vote_locks_weight_and_creates_timer() {
    let dao = dao();
    let proposal = ProposalPuzzle::launch(
        dao.proposal_class,
        proposal_id(),
        PuzzleHash::new([0x60; 32]),
    );
    let proposal_coin = Coin::new(
        CoinId::new([0x01; 32]),
        proposal.full_puzzle_hash(),
        Amount::new(1),
    );

    let lockup = LockupPuzzle::new(dao.lockup_class, vec![], PuzzleHash::new([0x02; 32]));
    let lockup_coin = Coin::new(CoinId::new([0x03; 32]), lockup.puzzle_hash(), Amount::new(10));

    let lockup_conds = lockup
        .evaluate(
            &lockup_coin,
            &LockupSolution::AddVote {
                proposal_id: proposal_id(),
                direction: VoteDirection::Yes,
                proposal_puzzle_hash: proposal.full_puzzle_hash(),
            },
        )
        .unwrap();

    let proposal_conds = proposal
        .evaluate(
            &proposal_coin,
            &ProposalSolution::Vote(VoteOp {
                direction: VoteDirection::Yes,
                retract: false,
                casts: vec![VoteCast {
                    amount: lockup_coin.amount,
                    coin_id: lockup_coin.coin_id(),
                    previous_votes: vec![],
                    owner_puzzle_hash: PuzzleHash::new([0x02; 32]),
                }],
            }),
        )
        .unwrap();

    // (0, 0) + yes 10 -> (10, 10), plus the timer coin.
    let successor = proposal.with_tallies(Amount::new(10), Amount::new(10));
    assert_eq!(
        proposal_conds[0],
        Condition::CreateCoin {
            puzzle_hash: successor.full_puzzle_hash(),
            amount: Amount::new(1),
        }
    );
    assert_eq!(
        proposal_conds[1],
        Condition::CreateCoin {
            puzzle_hash: proposal.timer().puzzle_hash(),
            amount: Amount::ZERO,
        }
    );

    let mut batch = SpendBatch::new();
    batch.push(CoinSpend::new(lockup_coin, 0, lockup_conds));
    batch.push(CoinSpend::new(proposal_coin, 0, proposal_conds));
    batch.validate(0).unwrap();
}

/// The same lockup coin cannot vote twice on one proposal: the successor
/// remembers the id and refuses the second add.
#[test]
fn second_vote_from_same_lockup_fails() {
    let dao = dao();
    let lockup = LockupPuzzle::new(dao.lockup_class, vec![], PuzzleHash::new([0x02; 32]));
    let coin = Coin::new(CoinId::new([0x03; 32]), lockup.puzzle_hash(), Amount::new(10));
    let add = LockupSolution::AddVote {
        proposal_id: proposal_id(),
        direction: VoteDirection::Yes,
        proposal_puzzle_hash: PuzzleHash::new([0x04; 32]),
    };
    lockup.evaluate(&coin, &add).unwrap();

    // The recreated lockup carries the proposal id in its history.
    let successor = LockupPuzzle::new(
        dao.lockup_class,
        vec![proposal_id()],
        PuzzleHash::new([0x02; 32]),
    );
    let successor_coin = Coin::new(coin.coin_id(), successor.puzzle_hash(), Amount::new(10));
    let result = successor.evaluate(&successor_coin, &add);
    assert!(matches!(result, Err(GovernanceError::DuplicateVote { .. })));
}

/// A lockup cannot retract a vote while the proposal is still open: the
/// beacon assertion has no matching announcement and the batch is rejected.
/// After the beacon exists, the same retraction validates.
#[test]
fn retract_needs_the_finished_beacon() {
    let dao = dao();
    let lockup = LockupPuzzle::new(
        dao.lockup_class,
        vec![proposal_id()],
        PuzzleHash::new([0x02; 32]),
    );
    let lockup_coin = Coin::new(CoinId::new([0x03; 32]), lockup.puzzle_hash(), Amount::new(10));
    let retract_conds = lockup
        .evaluate(
            &lockup_coin,
            &LockupSolution::RetractVote {
                proposal_id: proposal_id(),
                direction: VoteDirection::Yes,
            },
        )
        .unwrap();

    let mut premature = SpendBatch::new();
    premature.push(CoinSpend::new(lockup_coin, 0, retract_conds.clone()));
    assert!(premature.validate(0).is_err());

    let beacon = FinishedPuzzle::new(proposal_id());
    let beacon_coin = Coin::new(
        CoinId::new([0x05; 32]),
        beacon.full_puzzle_hash(),
        Amount::new(1),
    );
    let beacon_conds = beacon.evaluate(&beacon_coin);

    let mut released = SpendBatch::new();
    released.push(CoinSpend::new(lockup_coin, 0, retract_conds));
    released.push(CoinSpend::new(beacon_coin, 0, beacon_conds));
    released.validate(0).unwrap();
}

/// A passing proposal closes through the full four-coin batch: proposal,
/// timer, treasury, and a funding coin, every announcement pair matching
/// byte-for-byte.
#[test]
fn passing_close_executes_through_treasury() {
    let dao = dao();
    let payload = SpendPayload {
        treasury_id: dao.treasury.treasury_id,
        payouts: vec![
            (PuzzleHash::new([0xDA; 32]), Amount::new(1000)),
            (PuzzleHash::new([0xCA; 32]), Amount::new(100)),
        ],
        funding_puzzle_hash: dao.funding.puzzle_hash(),
    };
    let proposal = ProposalPuzzle::launch(dao.proposal_class, proposal_id(), payload.puzzle_hash())
        .with_tallies(Amount::new(950), Amount::new(1200));

    // The launch-state coin parents the timer; the live coin is its child.
    let launch_parent = CoinId::new([0x10; 32]);
    let launch_proposal =
        ProposalPuzzle::launch(dao.proposal_class, proposal_id(), payload.puzzle_hash());
    let launch_coin = Coin::new(
        launch_parent,
        launch_proposal.full_puzzle_hash(),
        Amount::new(11),
    );
    let timer = proposal.timer();
    let timer_coin = Coin::new(launch_coin.coin_id(), timer.puzzle_hash(), Amount::ZERO);
    let proposal_coin = Coin::new(
        launch_coin.coin_id(),
        proposal.full_puzzle_hash(),
        Amount::new(11),
    );

    let treasury_parent = Coin::new(
        CoinId::new([0x21; 32]),
        dao.treasury.full_puzzle_hash(),
        Amount::new(1),
    );
    let treasury_coin = Coin::new(
        treasury_parent.coin_id(),
        dao.treasury.full_puzzle_hash(),
        Amount::new(1),
    );
    let funding_coin = Coin::new(
        CoinId::new([0x30; 32]),
        dao.funding.puzzle_hash(),
        Amount::new(100_000),
    );

    let proposal_conds = singleton_spend(
        proposal_id(),
        &LineageProof {
            parent_parent_id: launch_parent,
            parent_inner_puzzle_hash: launch_proposal.inner_puzzle_hash(),
            parent_amount: Amount::new(11),
        },
        proposal
            .evaluate(
                &proposal_coin,
                &ProposalSolution::Close(CloseOp {
                    validator_hash: dao.validator.validator_hash(),
                    rules: dao.rules,
                    self_destruct: false,
                }),
            )
            .unwrap(),
    );

    let timer_conds = timer.evaluate(&TimerSolution {
        yes_votes: Amount::new(950),
        total_votes: Amount::new(1200),
        proposed_puzzle_hash: payload.puzzle_hash(),
        timelock: dao.rules.proposal_timelock,
        parent_parent_id: launch_parent,
        parent_amount: Amount::new(11),
    });

    let treasury_conds = singleton_spend(
        dao.treasury.treasury_id,
        &LineageProof {
            parent_parent_id: treasury_parent.parent_id,
            parent_inner_puzzle_hash: dao.treasury.inner_puzzle_hash(),
            parent_amount: treasury_parent.amount,
        },
        dao.treasury
            .evaluate(
                &treasury_coin,
                &TreasurySolution::Execute {
                    info: ProposalInfo {
                        proposal_coin_id: proposal_coin.coin_id(),
                        proposed_puzzle_hash: payload.puzzle_hash(),
                        kind: PayloadKind::Spend,
                    },
                    tally: VoteTally {
                        proposal_id: proposal_id(),
                        total_votes: Amount::new(1200),
                        yes_votes: Amount::new(950),
                        parent_id: proposal_coin.parent_id,
                        amount: proposal_coin.amount,
                    },
                    payload: ProposedPayload::Spend(payload.clone()),
                    funding: vec![(funding_coin.coin_id(), funding_coin.amount)],
                },
            )
            .unwrap(),
    );

    let funding_conds = dao
        .funding
        .evaluate(
            &funding_coin,
            &FundingSolution::Delegated {
                treasury_inner_puzzle_hash: dao.treasury.inner_puzzle_hash(),
                delegated_puzzle_hash: payload.puzzle_hash(),
                conditions: vec![],
            },
        )
        .unwrap();

    // The commitment pair the whole protocol hinges on: the treasury's
    // asserted coin announcement is exactly the hash of the proposal coin id
    // and the proposal's announced message.
    let proposal_cca = proposal_conds
        .iter()
        .find_map(|c| match c {
            Condition::CreateCoinAnnouncement { message } => Some(message.clone()),
            _ => None,
        })
        .unwrap();
    let treasury_aca = treasury_conds
        .iter()
        .find_map(|c| match c {
            Condition::AssertCoinAnnouncement { announcement } => Some(*announcement),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        coin_announcement_id(&proposal_coin.coin_id(), &proposal_cca),
        treasury_aca
    );

    // The treasury's authorization announcement is what the proposal asserts.
    let expected_authorization = puzzle_announcement_id(
        &dao.treasury.full_puzzle_hash(),
        proposal_id().as_bytes(),
    );
    assert!(proposal_conds.contains(&Condition::AssertPuzzleAnnouncement {
        announcement: expected_authorization,
    }));

    // Payouts and residual both come out of the treasury spend.
    assert!(treasury_conds.contains(&Condition::CreateCoin {
        puzzle_hash: PuzzleHash::new([0xDA; 32]),
        amount: Amount::new(1000),
    }));
    assert!(treasury_conds.contains(&Condition::CreateCoin {
        puzzle_hash: dao.validator.excess_puzzle_hash,
        amount: Amount::new(100_000 - 1100),
    }));

    // Assemble and validate the batch at a height satisfying the timelock
    // (timer confirmed at 50) and the soft close (proposal at 100).
    let mut batch = SpendBatch::new();
    batch.push(CoinSpend::new(proposal_coin, 100, proposal_conds));
    batch.push(CoinSpend::new(timer_coin, 50, timer_conds));
    batch.push(CoinSpend::new(treasury_coin, 90, treasury_conds));
    batch.push(CoinSpend::new(funding_coin, 0, funding_conds));
    batch.validate(110).unwrap();

    // Inside the soft-close quiet window the same batch is rejected.
    assert!(batch.validate(104).is_err());
}

/// A proposal under attendance closes as Failed against the treasury's
/// oracle announcement; no validator run, no payout.
#[test]
fn failed_close_pairs_with_the_oracle() {
    let dao = dao();
    let payload_hash = PuzzleHash::new([0x60; 32]);
    let proposal = ProposalPuzzle::launch(dao.proposal_class, proposal_id(), payload_hash)
        .with_tallies(Amount::new(200), Amount::new(350));

    let launch_parent = CoinId::new([0x10; 32]);
    let launch_coin = Coin::new(
        launch_parent,
        ProposalPuzzle::launch(dao.proposal_class, proposal_id(), payload_hash)
            .full_puzzle_hash(),
        Amount::new(11),
    );
    let timer = proposal.timer();
    let timer_coin = Coin::new(launch_coin.coin_id(), timer.puzzle_hash(), Amount::ZERO);
    let proposal_coin = Coin::new(
        launch_coin.coin_id(),
        proposal.full_puzzle_hash(),
        Amount::new(11),
    );
    let treasury_coin = Coin::new(
        CoinId::new([0x20; 32]),
        dao.treasury.full_puzzle_hash(),
        Amount::new(1),
    );

    let proposal_conds = proposal
        .evaluate(
            &proposal_coin,
            &ProposalSolution::Close(CloseOp {
                validator_hash: dao.validator.validator_hash(),
                rules: dao.rules,
                self_destruct: false,
            }),
        )
        .unwrap();
    // A failed close still becomes a finished beacon.
    let beacon = FinishedPuzzle::new(proposal_id());
    assert!(proposal_conds.contains(&Condition::CreateCoin {
        puzzle_hash: beacon.full_puzzle_hash(),
        amount: Amount::new(11),
    }));

    let timer_conds = timer.evaluate(&TimerSolution {
        yes_votes: Amount::new(200),
        total_votes: Amount::new(350),
        proposed_puzzle_hash: payload_hash,
        timelock: dao.rules.proposal_timelock,
        parent_parent_id: launch_parent,
        parent_amount: Amount::new(11),
    });
    let oracle_conds = dao
        .treasury
        .evaluate(&treasury_coin, &TreasurySolution::Oracle)
        .unwrap();

    let mut batch = SpendBatch::new();
    batch.push(CoinSpend::new(proposal_coin, 100, proposal_conds));
    batch.push(CoinSpend::new(timer_coin, 50, timer_conds));
    batch.push(CoinSpend::new(treasury_coin, 90, oracle_conds));
    batch.validate(110).unwrap();
}

/// The self-destruct path closes a broken proposal with no timer at all,
/// after the longer self-destruct delay.
#[test]
fn self_destruct_closes_without_a_timer() {
    let dao = dao();
    let proposal = ProposalPuzzle::launch(
        dao.proposal_class,
        proposal_id(),
        PuzzleHash::new([0x60; 32]),
    )
    .with_tallies(Amount::new(5), Amount::new(9));
    let proposal_coin = Coin::new(
        CoinId::new([0x10; 32]),
        proposal.full_puzzle_hash(),
        Amount::new(11),
    );
    let treasury_coin = Coin::new(
        CoinId::new([0x20; 32]),
        dao.treasury.full_puzzle_hash(),
        Amount::new(1),
    );

    let proposal_conds = proposal
        .evaluate(
            &proposal_coin,
            &ProposalSolution::Close(CloseOp {
                validator_hash: dao.validator.validator_hash(),
                rules: dao.rules,
                self_destruct: true,
            }),
        )
        .unwrap();
    let oracle_conds = dao
        .treasury
        .evaluate(&treasury_coin, &TreasurySolution::Oracle)
        .unwrap();

    let mut batch = SpendBatch::new();
    batch.push(CoinSpend::new(proposal_coin, 0, proposal_conds));
    batch.push(CoinSpend::new(treasury_coin, 90, oracle_conds));
    // Not until self_destruct_time blocks have passed.
    assert!(batch.validate(500).is_err());
    batch.validate(1100).unwrap();
}

/// An accepted update proposal replaces the treasury's rule set while its
/// singleton identity survives unchanged.
#[test]
fn update_proposal_replaces_treasury_rules() {
    let dao = dao();
    let new_rules = DaoRules {
        proposal_timelock: 900,
        soft_close_length: 10,
        attendance_required: Amount::new(500),
        pass_margin_bps: 2500,
        self_destruct_time: 1000,
        oracle_spend_delay: 20,
    };
    let payload = UpdatePayload {
        validator: dao.validator.clone(),
        new_rules,
    };
    let proposal = ProposalPuzzle::launch(dao.proposal_class, proposal_id(), payload.puzzle_hash())
        .with_tallies(Amount::new(950), Amount::new(1200));
    let proposal_coin = Coin::new(
        CoinId::new([0x10; 32]),
        proposal.full_puzzle_hash(),
        Amount::new(11),
    );
    let treasury_coin = Coin::new(
        CoinId::new([0x20; 32]),
        dao.treasury.full_puzzle_hash(),
        Amount::new(1),
    );

    let treasury_conds = dao
        .treasury
        .evaluate(
            &treasury_coin,
            &TreasurySolution::Execute {
                info: ProposalInfo {
                    proposal_coin_id: proposal_coin.coin_id(),
                    proposed_puzzle_hash: payload.puzzle_hash(),
                    kind: PayloadKind::Update,
                },
                tally: VoteTally {
                    proposal_id: proposal_id(),
                    total_votes: Amount::new(1200),
                    yes_votes: Amount::new(950),
                    parent_id: proposal_coin.parent_id,
                    amount: proposal_coin.amount,
                },
                payload: ProposedPayload::Update(payload.clone()),
                funding: vec![],
            },
        )
        .unwrap();

    let successor = TreasuryPuzzle::new(dao.treasury.treasury_id, dao.validator.clone(), new_rules);
    assert!(treasury_conds.contains(&Condition::CreateCoin {
        puzzle_hash: successor.full_puzzle_hash(),
        amount: Amount::new(1),
    }));
    // The old identity is not recreated.
    assert!(!treasury_conds.contains(&Condition::CreateCoin {
        puzzle_hash: dao.treasury.full_puzzle_hash(),
        amount: Amount::new(1),
    }));
}

/// Two funding coins of 100 and 200 merge into an empty aggregator and the
/// output is exactly 300; a forged manifest breaks the batch.
#[test]
fn merge_accounting_is_exact() {
    let dao = dao();
    let aggregator_coin = Coin::new(
        CoinId::new([0xA0; 32]),
        dao.funding.puzzle_hash(),
        Amount::ZERO,
    );
    let a = Coin::new(
        CoinId::new([0xA1; 32]),
        dao.funding.puzzle_hash(),
        Amount::new(100),
    );
    let b = Coin::new(
        CoinId::new([0xA2; 32]),
        dao.funding.puzzle_hash(),
        Amount::new(200),
    );
    let contributions = vec![(a.coin_id(), a.amount), (b.coin_id(), b.amount)];

    let agg_conds = dao
        .funding
        .evaluate(
            &aggregator_coin,
            &FundingSolution::MergeAggregate {
                contributions: contributions.clone(),
            },
        )
        .unwrap();
    assert!(agg_conds.contains(&Condition::CreateCoin {
        puzzle_hash: dao.funding.puzzle_hash(),
        amount: Amount::new(300),
    }));

    let mut batch = SpendBatch::new();
    batch.push(CoinSpend::new(aggregator_coin, 0, agg_conds));
    for contributor in [a, b] {
        let conds = dao
            .funding
            .evaluate(
                &contributor,
                &FundingSolution::MergeContribute {
                    aggregator_coin,
                    contributions: contributions.clone(),
                },
            )
            .unwrap();
        batch.push(CoinSpend::new(contributor, 0, conds));
    }
    batch.validate(0).unwrap();

    // A contributor working from a different manifest cannot pair with the
    // aggregator's announcement.
    let forged = vec![(a.coin_id(), a.amount)];
    let forged_conds = dao
        .funding
        .evaluate(
            &a,
            &FundingSolution::MergeContribute {
                aggregator_coin,
                contributions: forged,
            },
        )
        .unwrap();
    let mut bad = SpendBatch::new();
    bad.push(CoinSpend::new(
        aggregator_coin,
        0,
        dao.funding
            .evaluate(
                &aggregator_coin,
                &FundingSolution::MergeAggregate {
                    contributions: contributions.clone(),
                },
            )
            .unwrap(),
    ));
    bad.push(CoinSpend::new(a, 0, forged_conds));
    assert!(bad.validate(0).is_err());
}

/// Once finished, a proposal's beacon is a fixed point: spending it
/// recreates it and re-announces the id, forever.
#[test]
fn finished_beacon_is_permanent() {
    let beacon = FinishedPuzzle::new(proposal_id());
    let coin = Coin::new(
        CoinId::new([0x05; 32]),
        beacon.full_puzzle_hash(),
        Amount::new(1),
    );
    let conds = beacon.evaluate(&coin);
    let recreated = conds
        .iter()
        .find_map(Condition::as_created_coin)
        .unwrap();
    assert_eq!(recreated, (beacon.full_puzzle_hash(), Amount::new(1)));

    // And the child's spend looks exactly the same.
    let child = Coin::new(coin.coin_id(), beacon.full_puzzle_hash(), Amount::new(1));
    let child_conds = beacon.evaluate(&child);
    assert_eq!(
        child_conds
            .iter()
            .find_map(Condition::as_created_coin)
            .unwrap(),
        (beacon.full_puzzle_hash(), Amount::new(1)),
    );
}
