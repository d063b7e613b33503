//! Several depositors sharing token pools across calibration cycles
//!
//! Cycle period 10s, window 5s. Timestamps stand in for waiting on the
//! wall clock: t=0 opens cycle 0, t=5 closes its window, t=10 opens cycle 1.

use etf_ledger::*;

const INITIAL_DEPOSIT: Amount = 5 * UNIT;
const TOKEN_SUBMISSION: Amount = 3 * UNIT;
const USER_1_DEPOSIT: Amount = 5 * UNIT;
const USER_2_DEPOSIT: Amount = 2 * UNIT;

fn account(name: &str) -> AccountId {
    AccountId::new(name)
}

fn share(pool: Amount, balance: Amount) -> Amount {
    pool * balance / (INITIAL_DEPOSIT + USER_1_DEPOSIT + USER_2_DEPOSIT)
}

struct Scenario {
    ledger: Ledger,
    bank: InMemoryBank,
    token_1: TokenKey,
    token_2: TokenKey,
}

impl Scenario {
    fn new() -> Self {
        let mut bank = InMemoryBank::new(account("etf"));
        for name in ["owner", "user1", "user2"] {
            bank.mint(&Asset::Native, &account(name), 100 * UNIT);
        }
        let token_1 = TokenKey::new("0xtoken1");
        let token_2 = TokenKey::new("0xtoken2");
        bank.mint(&Asset::Token(token_1.clone()), &account("sponsor"), TOKEN_SUBMISSION);
        bank.mint(&Asset::Token(token_2.clone()), &account("sponsor"), TOKEN_SUBMISSION);

        let mut ledger = Ledger::new();
        ledger
            .initialize(&mut bank, &account("owner"), 10, 5, INITIAL_DEPOSIT, 0)
            .unwrap();

        Self {
            ledger,
            bank,
            token_1,
            token_2,
        }
    }

    fn native(&self, name: &str) -> Amount {
        self.bank.balance_of(&Asset::Native, &account(name))
    }

    fn token_balance(&self, token: &TokenKey, name: &str) -> Amount {
        self.bank.balance_of(&Asset::Token(token.clone()), &account(name))
    }

    /// Deposits and the first submission, up to the start of cycle 1
    fn seed(&mut self) {
        self.ledger
            .deposit(&mut self.bank, &account("user1"), USER_1_DEPOSIT, 0)
            .unwrap();
        assert_eq!(self.native("user1"), 100 * UNIT - USER_1_DEPOSIT);
        assert_eq!(self.ledger.user_data(&account("user1")).balance, USER_1_DEPOSIT);

        let token_1 = self.token_1.clone();
        self.ledger
            .submit_token(&mut self.bank, &account("sponsor"), &token_1, TOKEN_SUBMISSION)
            .unwrap();
        assert_eq!(self.ledger.total_tokens(), 1);
        assert_eq!(self.ledger.token_balance(&token_1), TOKEN_SUBMISSION);
        assert_eq!(self.ledger.token_address(0), Some(&token_1));

        // Window of cycle 0 has closed
        assert!(!self.ledger.is_calibration_open(6));
        self.ledger
            .deposit(&mut self.bank, &account("user2"), USER_2_DEPOSIT, 6)
            .unwrap();
        assert_eq!(self.native("user2"), 100 * UNIT - USER_2_DEPOSIT);
        assert_eq!(self.ledger.user_data(&account("user2")).balance, USER_2_DEPOSIT);
    }
}

#[test]
fn test_multi_user_interactions() {
    let mut s = Scenario::new();
    s.seed();
    let token_1 = s.token_1.clone();
    let token_2 = s.token_2.clone();

    // Cycle 1 opens
    let preview = s
        .ledger
        .expected_token_calibration(&account("user1"), &token_1, 10)
        .unwrap();
    assert!(preview.can_withdraw);
    assert_eq!(preview.amount, share(TOKEN_SUBMISSION, USER_1_DEPOSIT));
    assert_eq!(preview.amount, 1_250_000_000_000_000_000);

    s.ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_1, 10)
        .unwrap();
    assert_eq!(s.token_balance(&token_1, "user1"), 1_250_000_000_000_000_000);

    // user2 deposited during cycle 0, after its start
    assert_eq!(
        s.ledger
            .calibrate_token(&mut s.bank, &account("user2"), &token_1, 11),
        Err(LedgerError::NotEligibleYet)
    );
    let preview = s
        .ledger
        .expected_token_calibration(&account("user2"), &token_1, 11)
        .unwrap();
    assert!(!preview.can_withdraw);
    assert_eq!(preview.amount, share(TOKEN_SUBMISSION, USER_2_DEPOSIT));

    let err = s
        .ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_1, 12)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "402: User has allocated tokens before in this calibration cycle"
    );

    assert!(!s.ledger.is_calibration_open(15));
    assert!(s.ledger.is_calibration_open(20));

    // Cycle 2
    s.ledger
        .calibrate_token(&mut s.bank, &account("user2"), &token_1, 20)
        .unwrap();
    assert_eq!(s.token_balance(&token_1, "user2"), 500_000_000_000_000_000);

    s.ledger
        .submit_token(&mut s.bank, &account("sponsor"), &token_2, TOKEN_SUBMISSION)
        .unwrap();
    assert_eq!(s.ledger.total_tokens(), 2);
    assert_eq!(s.ledger.token_balance(&token_2), TOKEN_SUBMISSION);
    assert_eq!(s.ledger.token_address(1), Some(&token_2));

    s.ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_2, 21)
        .unwrap();
    assert_eq!(
        s.token_balance(&token_2, "user1"),
        share(TOKEN_SUBMISSION, USER_1_DEPOSIT)
    );
    s.ledger
        .calibrate_token(&mut s.bank, &account("user2"), &token_2, 22)
        .unwrap();
    assert_eq!(
        s.token_balance(&token_2, "user2"),
        share(TOKEN_SUBMISSION, USER_2_DEPOSIT)
    );
}

#[test]
fn test_claims_are_tracked_per_pool() {
    let mut s = Scenario::new();
    s.seed();
    let token_1 = s.token_1.clone();
    let token_2 = s.token_2.clone();
    s.ledger
        .submit_token(&mut s.bank, &account("sponsor"), &token_2, TOKEN_SUBMISSION)
        .unwrap();

    s.ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_1, 10)
        .unwrap();
    // Claiming token 1 does not use up the cycle for token 2
    s.ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_2, 10)
        .unwrap();
    s.ledger
        .calibrate_mynt(&mut s.bank, &account("user1"), 10)
        .unwrap();
}

/// Claims never reduce a pool's submitted total, so each cycle shares out
/// the full submission again. Only the ledger's real holdings stop it.
#[test]
fn test_nominal_pool_is_shared_out_again_each_cycle() {
    let mut s = Scenario::new();
    s.seed();
    let token_1 = s.token_1.clone();
    let user_1_share = share(TOKEN_SUBMISSION, USER_1_DEPOSIT);

    s.ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_1, 10)
        .unwrap();
    s.ledger
        .calibrate_token(&mut s.bank, &account("user2"), &token_1, 20)
        .unwrap();
    s.ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_1, 20)
        .unwrap();
    assert_eq!(s.token_balance(&token_1, "user1"), 2 * user_1_share);

    // user1 + user2 + user1 drained the 3 UNIT submission exactly
    assert_eq!(s.bank.holdings(&Asset::Token(token_1.clone())), 0);
    assert_eq!(s.ledger.token_balance(&token_1), TOKEN_SUBMISSION);

    let err = s
        .ledger
        .calibrate_token(&mut s.bank, &account("user1"), &token_1, 30)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Transfer(_)));

    let pool = s
        .ledger
        .pools()
        .get(&PoolKey::Token(token_1.clone()))
        .unwrap();
    assert_eq!(pool.claimed_cycle(&account("user1")), Some(2));
    assert_eq!(pool.total_distributed(), TOKEN_SUBMISSION);
}

#[test]
fn test_total_deposits_tracks_balances() {
    let mut s = Scenario::new();
    s.seed();
    s.ledger
        .withdraw(&mut s.bank, &account("user1"), UNIT)
        .unwrap();
    s.ledger
        .deposit(&mut s.bank, &account("user2"), UNIT, 30)
        .unwrap();

    let snapshot = s.ledger.snapshot();
    let sum: Amount = snapshot.users.values().map(|record| record.balance).sum();
    assert_eq!(snapshot.total_deposits, sum);
    assert_eq!(snapshot.total_deposits, 12 * UNIT);
    assert_eq!(s.bank.holdings(&Asset::Native), 12 * UNIT);
}

/// 18-decimal amounts whose product exceeds `u128` still pay out
#[test]
fn test_large_balances_share_pool_without_overflow() {
    let mut bank = InMemoryBank::new(account("etf"));
    bank.mint(&Asset::Native, &account("owner"), UNIT);
    bank.mint(&Asset::Native, &account("whale"), 100 * UNIT);
    let token = TokenKey::new("0xtoken");
    bank.mint(&Asset::Token(token.clone()), &account("sponsor"), 10 * UNIT);

    let mut ledger = Ledger::new();
    ledger
        .initialize(&mut bank, &account("owner"), 10, 5, UNIT, 0)
        .unwrap();
    ledger
        .deposit(&mut bank, &account("whale"), 100 * UNIT, 0)
        .unwrap();
    ledger
        .submit_token(&mut bank, &account("sponsor"), &token, 10 * UNIT)
        .unwrap();

    // 10e18 * 100e18 / 101e18
    let expected: Amount = 9_900_990_099_009_900_990;
    let preview = ledger
        .expected_token_calibration(&account("whale"), &token, 10)
        .unwrap();
    assert!(preview.can_withdraw);
    assert_eq!(preview.amount, expected);

    assert_eq!(
        ledger.calibrate_token(&mut bank, &account("whale"), &token, 10),
        Ok(expected)
    );
    assert_eq!(bank.balance_of(&Asset::Token(token), &account("whale")), expected);
}
