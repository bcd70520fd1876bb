use anchor_lang::prelude::*;

use crate::error::DarkbookError;
use crate::state::{
    quote_notional, EncryptedOrder, Market, OrderStatus, Side, TradeSettlement, UserPosition,
    MAX_ACTIVE_ORDERS,
};

/// Capacity of the encrypted book per market. Matches the MPC circuit's
/// fixed orderbook size.
pub const MAX_BOOK_ORDERS: u32 = 32;

/// Reserve worst-case collateral for a newly placed order and register it
/// in the market's book counters.
pub fn reserve_for_order(
    market: &mut Market,
    position: &mut UserPosition,
    side: Side,
    worst_case_collateral: u64,
) -> Result<()> {
    require!(
        position.active_order_count < MAX_ACTIVE_ORDERS,
        DarkbookError::TooManyOrders
    );
    require!(
        market
            .active_bids
            .checked_add(market.active_asks)
            .ok_or(DarkbookError::MathOverflow)?
            < MAX_BOOK_ORDERS,
        DarkbookError::OrderbookFull
    );

    let is_quote = side.locks_quote();
    position.lock(worst_case_collateral, is_quote)?;
    market.lock(worst_case_collateral, is_quote)?;

    position.active_order_count = position
        .active_order_count
        .checked_add(1)
        .ok_or(DarkbookError::TooManyOrders)?;
    match side {
        Side::Buy => market.active_bids += 1,
        Side::Sell => market.active_asks += 1,
    }
    Ok(())
}

/// Re-validate a maker/taker pair when the match callback lands. Either
/// order may have been cancel-requested or terminated since the computation
/// was queued; the callback loses that race.
pub fn validate_match(maker: &EncryptedOrder, taker: &EncryptedOrder) -> Result<()> {
    require!(maker.order_id != taker.order_id, DarkbookError::NoMatchingOrders);
    require!(maker.side != taker.side, DarkbookError::NoMatchingOrders);
    require!(
        maker.is_matchable() && taker.is_matchable(),
        DarkbookError::NoMatchingOrders
    );
    require!(maker.owner != taker.owner, DarkbookError::SelfTrade);
    Ok(())
}

/// Apply a revealed match result to both orders. Returns `false` without
/// touching any state when the result cannot be applied - a zero price or
/// amount, or an order that stopped being matchable while the computation
/// ran. The match callback treats that as a voided match rather than an
/// error, because erroring would roll back its release of the market's
/// computation slot.
pub fn apply_match_result(
    market: &mut Market,
    maker: &mut EncryptedOrder,
    taker: &mut EncryptedOrder,
    execution_price: u64,
    execution_amount: u64,
    maker_fully_filled: bool,
    taker_fully_filled: bool,
) -> Result<bool> {
    if execution_price == 0 || execution_amount == 0 {
        return Ok(false);
    }
    if validate_match(maker, taker).is_err() {
        return Ok(false);
    }

    // Each leg's collateral consumption at the eventual settlement
    let quote_amount = quote_notional(execution_amount, execution_price)?;
    let (maker_consumed, taker_consumed) = if maker.side == Side::Buy {
        (quote_amount, execution_amount)
    } else {
        (execution_amount, quote_amount)
    };

    apply_fill(market, maker, execution_amount, maker_consumed, maker_fully_filled)?;
    apply_fill(market, taker, execution_amount, taker_consumed, taker_fully_filled)?;
    Ok(true)
}

/// Record a revealed fill against one order, earmarking the collateral the
/// fill will consume as pending until its settlement executes. A fully
/// filled order leaves the encrypted book, so its side counter drops here;
/// its collateral is released later, at settlement.
pub fn apply_fill(
    market: &mut Market,
    order: &mut EncryptedOrder,
    execution_amount: u64,
    collateral_consumed: u64,
    fully_filled: bool,
) -> Result<()> {
    order.filled_base = order
        .filled_base
        .checked_add(execution_amount)
        .ok_or(DarkbookError::MathOverflow)?;
    order.collateral_pending = order
        .collateral_pending
        .checked_add(collateral_consumed)
        .ok_or(DarkbookError::MathOverflow)?;
    if fully_filled {
        order.status = OrderStatus::Filled;
        match order.side {
            Side::Buy => market.active_bids = market.active_bids.saturating_sub(1),
            Side::Sell => market.active_asks = market.active_asks.saturating_sub(1),
        }
    } else {
        order.status = OrderStatus::PartiallyFilled;
    }
    Ok(())
}

/// Finalize a two-phase cancel once the MPC confirms removal from the
/// encrypted book. Returns the amount of collateral released. Collateral
/// owed to a revealed fill that has not settled yet stays locked; its
/// settlement consumes it later.
pub fn finalize_cancel(
    market: &mut Market,
    order: &mut EncryptedOrder,
    position: &mut UserPosition,
) -> Result<u64> {
    require!(
        order.status == OrderStatus::CancelRequested,
        DarkbookError::OrderAlreadyCancelled
    );

    let releasable = order
        .collateral_locked
        .saturating_sub(order.collateral_pending);
    let is_quote = order.side.locks_quote();
    if releasable > 0 {
        position.unlock(releasable, is_quote)?;
        market.unlock(releasable, is_quote)?;
        order.collateral_locked = order.collateral_pending;
    }
    order.status = OrderStatus::Cancelled;

    position.active_order_count = position.active_order_count.saturating_sub(1);
    match order.side {
        Side::Buy => market.active_bids = market.active_bids.saturating_sub(1),
        Side::Sell => market.active_asks = market.active_asks.saturating_sub(1),
    }
    Ok(releasable)
}

/// Outcome of executing a settlement, for event emission
#[derive(Debug)]
pub struct TradeOutcome {
    pub base_amount: u64,
    pub quote_amount: u64,
    pub fee: u64,
}

/// Execute a revealed trade: consume both orders' reserved collateral, move
/// base seller->buyer and quote buyer->seller net of fee, release any
/// over-reserved remainder on fully filled orders, and mark the settlement
/// consumed.
///
/// Idempotence: a settled record is rejected up front, and the whole
/// transaction rolls back on any later failure, so the flag flips
/// false->true exactly once.
pub fn execute_trade(
    market: &mut Market,
    settlement: &mut TradeSettlement,
    buyer_order: &mut EncryptedOrder,
    seller_order: &mut EncryptedOrder,
    buyer_position: &mut UserPosition,
    seller_position: &mut UserPosition,
    now: i64,
) -> Result<TradeOutcome> {
    require!(!settlement.settled, DarkbookError::TradeAlreadySettled);

    let base_amount = settlement.execution_amount;
    let quote_amount = settlement.quote_amount()?;
    let fee = market.calculate_fee(quote_amount)?;
    let quote_to_seller = quote_amount
        .checked_sub(fee)
        .ok_or(DarkbookError::MathOverflow)?;

    // Consume each order's reservation. An order whose declared worst-case
    // bound turns out to be below the revealed notional cannot settle; the
    // under-declared order fails here without touching anyone's balances.
    buyer_order.collateral_locked = buyer_order
        .collateral_locked
        .checked_sub(quote_amount)
        .ok_or(DarkbookError::InsufficientBalance)?;
    seller_order.collateral_locked = seller_order
        .collateral_locked
        .checked_sub(base_amount)
        .ok_or(DarkbookError::InsufficientBalance)?;

    // The pending earmark recorded at match time is paid off here. Going
    // negative means the order and settlement ledgers diverged.
    buyer_order.collateral_pending = buyer_order
        .collateral_pending
        .checked_sub(quote_amount)
        .ok_or(DarkbookError::MathOverflow)?;
    seller_order.collateral_pending = seller_order
        .collateral_pending
        .checked_sub(base_amount)
        .ok_or(DarkbookError::MathOverflow)?;

    // Buyer: quote out of lock and out of custody, base in
    buyer_position.unlock(quote_amount, true)?;
    buyer_position.debit(quote_amount, false)?;
    buyer_position.credit(base_amount, true)?;

    // Seller: base out of lock and out of custody, quote (net of fee) in
    seller_position.unlock(base_amount, false)?;
    seller_position.debit(base_amount, true)?;
    seller_position.credit(quote_to_seller, false)?;

    // Market aggregates: locks shrink on both legs; base custody merely
    // changes hands, quote custody shrinks by the fee, which accrues to the
    // protocol bucket (the tokens stay in the quote vault).
    market.unlock(quote_amount, true)?;
    market.unlock(base_amount, false)?;
    market.debit_deposit(fee, false)?;
    market.quote_fees_accrued = market
        .quote_fees_accrued
        .checked_add(fee)
        .ok_or(DarkbookError::MathOverflow)?;

    release_if_filled(market, buyer_order, buyer_position)?;
    release_if_filled(market, seller_order, seller_position)?;

    settlement.settled = true;
    settlement.settled_at = now;

    Ok(TradeOutcome {
        base_amount,
        quote_amount,
        fee,
    })
}

/// Return a fully filled order's unused worst-case reservation to the
/// available balance. Collateral still owed to another unsettled fill stays
/// locked, and the order is retired from the position's count only once
/// nothing is owed.
fn release_if_filled(
    market: &mut Market,
    order: &mut EncryptedOrder,
    position: &mut UserPosition,
) -> Result<()> {
    if order.status != OrderStatus::Filled {
        return Ok(());
    }
    let remaining = order
        .collateral_locked
        .saturating_sub(order.collateral_pending);
    let is_quote = order.side.locks_quote();
    if remaining > 0 {
        position.unlock(remaining, is_quote)?;
        market.unlock(remaining, is_quote)?;
        order.collateral_locked = order.collateral_pending;
    }
    if order.collateral_pending == 0 {
        position.active_order_count = position.active_order_count.saturating_sub(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PRICE_SCALE;

    fn market() -> Market {
        Market {
            fee_rate_bps: 30,
            ..Market::default()
        }
    }

    fn position(owner: Pubkey, base: u64, quote: u64) -> UserPosition {
        UserPosition {
            owner,
            base_deposited: base,
            quote_deposited: quote,
            ..UserPosition::default()
        }
    }

    fn order(owner: Pubkey, order_id: u64, side: Side, collateral: u64) -> EncryptedOrder {
        EncryptedOrder {
            owner,
            order_id,
            side,
            status: OrderStatus::Open,
            collateral_locked: collateral,
            ..EncryptedOrder::default()
        }
    }

    fn keypair_pubkeys() -> (Pubkey, Pubkey) {
        (Pubkey::new_unique(), Pubkey::new_unique())
    }

    /// Place buy (A, worst-case 1000 quote) and sell (B, 10 base), then
    /// fully match 10 base at `execution_price`, ready to settle.
    fn matched_pair_at(
        execution_price: u64,
    ) -> (
        Market,
        TradeSettlement,
        EncryptedOrder,
        EncryptedOrder,
        UserPosition,
        UserPosition,
    ) {
        let (alice, bob) = keypair_pubkeys();
        let mut mkt = market();
        let mut buyer_pos = position(alice, 0, 1_000);
        let mut seller_pos = position(bob, 10, 0);
        let mut buy = order(alice, 1, Side::Buy, 0);
        let mut sell = order(bob, 2, Side::Sell, 0);

        reserve_for_order(&mut mkt, &mut buyer_pos, Side::Buy, 1_000).unwrap();
        buy.collateral_locked = 1_000;
        reserve_for_order(&mut mkt, &mut seller_pos, Side::Sell, 10).unwrap();
        sell.collateral_locked = 10;
        mkt.base_deposited = 10;
        mkt.quote_deposited = 1_000;

        assert!(apply_match_result(
            &mut mkt,
            &mut buy,
            &mut sell,
            execution_price,
            10,
            true,
            true
        )
        .unwrap());

        let settlement = TradeSettlement {
            maker: alice,
            taker: bob,
            maker_order_id: 1,
            taker_order_id: 2,
            execution_price,
            execution_amount: 10,
            maker_is_buy: true,
            ..TradeSettlement::default()
        };
        (mkt, settlement, buy, sell, buyer_pos, seller_pos)
    }

    fn matched_pair() -> (
        Market,
        TradeSettlement,
        EncryptedOrder,
        EncryptedOrder,
        UserPosition,
        UserPosition,
    ) {
        matched_pair_at(100 * PRICE_SCALE)
    }

    #[test]
    fn full_trade_settles_with_fee() {
        let (mut mkt, mut s, mut buy, mut sell, mut buyer, mut seller) = matched_pair();

        let outcome =
            execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
                .unwrap();
        assert_eq!(outcome.base_amount, 10);
        assert_eq!(outcome.quote_amount, 1_000);
        assert_eq!(outcome.fee, 3); // 30 bps of 1000

        // Buyer spent exactly the notional and holds the base
        assert_eq!(buyer.base_deposited, 10);
        assert_eq!(buyer.quote_deposited, 0);
        assert_eq!(buyer.quote_locked, 0);
        assert_eq!(buyer.active_order_count, 0);

        // Seller gave up the base and receives quote net of fee
        assert_eq!(seller.base_deposited, 0);
        assert_eq!(seller.quote_deposited, 997);
        assert_eq!(seller.base_locked, 0);

        // Aggregates mirror the sum over positions
        assert_eq!(mkt.base_locked, 0);
        assert_eq!(mkt.quote_locked, 0);
        assert_eq!(mkt.quote_fees_accrued, 3);
        assert_eq!(mkt.quote_deposited, 997);
        assert!(buyer.invariants_hold() && seller.invariants_hold());

        assert!(s.settled);
        assert_eq!(s.settled_at, 7);
    }

    #[test]
    fn over_reserved_remainder_is_unlocked() {
        // Worst-case bound of 1000 but execution only consumes 900
        let (mut mkt, mut s, mut buy, mut sell, mut buyer, mut seller) =
            matched_pair_at(90 * PRICE_SCALE);

        execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
            .unwrap();

        // 900 spent, the unused 100 back to available
        assert_eq!(buyer.quote_deposited, 100);
        assert_eq!(buyer.quote_locked, 0);
        assert_eq!(buyer.quote_available(), 100);
        assert_eq!(buy.collateral_locked, 0);
        assert_eq!(mkt.quote_locked, 0);
    }

    #[test]
    fn second_settlement_is_rejected() {
        let (mut mkt, mut s, mut buy, mut sell, mut buyer, mut seller) = matched_pair();
        execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
            .unwrap();

        let buyer_before = buyer.quote_deposited;
        let err =
            execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 8)
                .unwrap_err();
        assert_eq!(err, DarkbookError::TradeAlreadySettled.into());
        // No double transfer
        assert_eq!(buyer.quote_deposited, buyer_before);
        assert_eq!(s.settled_at, 7);
    }

    #[test]
    fn under_declared_collateral_cannot_settle() {
        let (mut mkt, mut s, mut buy, mut sell, mut buyer, mut seller) = matched_pair();
        // Buyer declared a bound below the revealed notional
        buy.collateral_locked = 500;

        let err =
            execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
                .unwrap_err();
        assert_eq!(err, DarkbookError::InsufficientBalance.into());
        // Seller balances untouched by the failed settlement
        assert_eq!(seller.base_deposited, 10);
        assert!(!s.settled);
    }

    #[test]
    fn self_trade_is_rejected() {
        let owner = Pubkey::new_unique();
        let buy = order(owner, 1, Side::Buy, 100);
        let sell = order(owner, 2, Side::Sell, 10);
        assert_eq!(
            validate_match(&buy, &sell).unwrap_err(),
            DarkbookError::SelfTrade.into()
        );
    }

    #[test]
    fn cancel_requested_order_loses_the_match_race() {
        let (alice, bob) = keypair_pubkeys();
        let buy = order(alice, 1, Side::Buy, 100);
        let mut sell = order(bob, 2, Side::Sell, 10);
        sell.status = OrderStatus::CancelRequested;
        assert_eq!(
            validate_match(&buy, &sell).unwrap_err(),
            DarkbookError::NoMatchingOrders.into()
        );
    }

    #[test]
    fn same_side_orders_do_not_match() {
        let (alice, bob) = keypair_pubkeys();
        let a = order(alice, 1, Side::Buy, 100);
        let b = order(bob, 2, Side::Buy, 100);
        assert!(validate_match(&a, &b).is_err());
    }

    #[test]
    fn cancel_unlocks_remaining_collateral() {
        let owner = Pubkey::new_unique();
        let mut mkt = market();
        let mut pos = position(owner, 0, 1_000);
        let mut ord = order(owner, 1, Side::Buy, 0);

        reserve_for_order(&mut mkt, &mut pos, Side::Buy, 1_000).unwrap();
        ord.collateral_locked = 1_000;
        assert_eq!(pos.quote_available(), 0);

        ord.status = OrderStatus::CancelRequested;
        let released = finalize_cancel(&mut mkt, &mut ord, &mut pos).unwrap();
        assert_eq!(released, 1_000);
        assert_eq!(pos.quote_available(), 1_000);
        assert_eq!(pos.active_order_count, 0);
        assert_eq!(ord.status, OrderStatus::Cancelled);
        assert_eq!(mkt.quote_locked, 0);
        assert_eq!(mkt.active_bids, 0);
    }

    #[test]
    fn cancel_callback_requires_cancel_requested_state() {
        let owner = Pubkey::new_unique();
        let mut mkt = market();
        let mut pos = position(owner, 0, 1_000);
        let mut ord = order(owner, 1, Side::Buy, 100);

        // Still open: the two-phase protocol was skipped
        assert!(finalize_cancel(&mut mkt, &mut ord, &mut pos).is_err());

        ord.status = OrderStatus::Cancelled;
        assert_eq!(
            finalize_cancel(&mut mkt, &mut ord, &mut pos).unwrap_err(),
            DarkbookError::OrderAlreadyCancelled.into()
        );
    }

    /// A cancel and a settlement can never both release the same reservation:
    /// whichever commits first flips the order out of the state the other
    /// requires.
    #[test]
    fn cancel_and_settle_cannot_both_release() {
        // Cancel wins: the order leaves the matchable set before any fill
        let owner = Pubkey::new_unique();
        let mut mkt = market();
        let mut pos = position(owner, 10, 0);
        let mut sell = order(owner, 1, Side::Sell, 0);
        reserve_for_order(&mut mkt, &mut pos, Side::Sell, 10).unwrap();
        sell.collateral_locked = 10;
        sell.status = OrderStatus::CancelRequested;
        assert_eq!(finalize_cancel(&mut mkt, &mut sell, &mut pos).unwrap(), 10);
        let fresh_buy = order(Pubkey::new_unique(), 9, Side::Buy, 100);
        assert!(validate_match(&fresh_buy, &sell).is_err());

        // Settle wins: a filled order can no longer be cancel-finalized
        let (mut mkt, mut s, mut buy, mut sell, mut buyer, mut seller) = matched_pair();
        execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
            .unwrap();
        let base_locked_after = seller.base_locked;
        assert!(finalize_cancel(&mut mkt, &mut sell, &mut seller).is_err());
        assert_eq!(seller.base_locked, base_locked_after);
    }

    /// Cancelling the unfilled remainder of a partially filled order keeps
    /// the collateral its unsettled fill still owes, so the pending
    /// settlement can execute afterwards and both sides get paid out.
    #[test]
    fn cancel_after_partial_fill_keeps_settlement_executable() {
        let (alice, bob) = keypair_pubkeys();
        let mut mkt = market();
        let mut buyer = position(alice, 0, 600);
        let mut seller = position(bob, 10, 0);
        let mut buy = order(alice, 1, Side::Buy, 0);
        let mut sell = order(bob, 2, Side::Sell, 0);
        reserve_for_order(&mut mkt, &mut buyer, Side::Buy, 600).unwrap();
        buy.collateral_locked = 600;
        reserve_for_order(&mut mkt, &mut seller, Side::Sell, 10).unwrap();
        sell.collateral_locked = 10;
        mkt.base_deposited = 10;
        mkt.quote_deposited = 600;

        // 6 of the seller's 10 base are revealed as filled, settlement pending
        assert!(apply_match_result(
            &mut mkt,
            &mut buy,
            &mut sell,
            100 * PRICE_SCALE,
            6,
            true,
            false
        )
        .unwrap());
        let mut s = TradeSettlement {
            maker: alice,
            taker: bob,
            maker_order_id: 1,
            taker_order_id: 2,
            execution_price: 100 * PRICE_SCALE,
            execution_amount: 6,
            maker_is_buy: true,
            ..TradeSettlement::default()
        };

        // Cancelling the remainder only frees the 4 base nothing owes
        sell.status = OrderStatus::CancelRequested;
        assert_eq!(finalize_cancel(&mut mkt, &mut sell, &mut seller).unwrap(), 4);
        assert_eq!(sell.collateral_locked, 6);
        assert_eq!(seller.base_locked, 6);

        // The pending settlement still executes and releases everything
        execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
            .unwrap();
        assert_eq!(seller.base_locked, 0);
        assert_eq!(seller.base_deposited, 4);
        assert_eq!(seller.quote_deposited, 599); // 600 minus the 30 bps fee
        assert_eq!(buyer.quote_locked, 0);
        assert_eq!(buyer.base_deposited, 6);
        assert_eq!(sell.collateral_locked, 0);
        assert!(s.settled);
        assert!(buyer.invariants_hold() && seller.invariants_hold());
    }

    #[test]
    fn partial_fill_keeps_order_matchable_and_collateral_flowing() {
        let (alice, bob) = keypair_pubkeys();
        let mut mkt = market();
        let mut buyer = position(alice, 0, 600);
        let mut seller = position(bob, 10, 0);
        let mut buy = order(alice, 1, Side::Buy, 0);
        let mut sell = order(bob, 2, Side::Sell, 0);
        reserve_for_order(&mut mkt, &mut buyer, Side::Buy, 600).unwrap();
        buy.collateral_locked = 600;
        reserve_for_order(&mut mkt, &mut seller, Side::Sell, 10).unwrap();
        sell.collateral_locked = 10;
        mkt.base_deposited = 10;
        mkt.quote_deposited = 600;

        // The buy fills completely against 6 of the seller's 10 base
        assert!(apply_match_result(
            &mut mkt,
            &mut buy,
            &mut sell,
            100 * PRICE_SCALE,
            6,
            true,
            false
        )
        .unwrap());
        assert_eq!(sell.status, OrderStatus::PartiallyFilled);
        assert!(sell.is_matchable());
        assert_eq!(mkt.active_asks, 1);

        let mut s = TradeSettlement {
            maker: alice,
            taker: bob,
            maker_order_id: 1,
            taker_order_id: 2,
            execution_price: 100 * PRICE_SCALE,
            execution_amount: 6,
            maker_is_buy: true,
            ..TradeSettlement::default()
        };
        execute_trade(&mut mkt, &mut s, &mut buy, &mut sell, &mut buyer, &mut seller, 7)
            .unwrap();
        // Seller's remaining 4 base stay locked behind the open order
        assert_eq!(sell.collateral_locked, 4);
        assert_eq!(seller.base_locked, 4);
        assert_eq!(seller.active_order_count, 1);
    }

    /// A pair that stopped being matchable while the computation ran is a
    /// voided result, not an error: nothing about the orders or the book
    /// counters may change.
    #[test]
    fn lost_race_voids_the_match_without_state_changes() {
        let (alice, bob) = keypair_pubkeys();
        let mut mkt = market();
        mkt.active_bids = 1;
        mkt.active_asks = 1;
        let mut buy = order(alice, 1, Side::Buy, 1_000);
        let mut sell = order(bob, 2, Side::Sell, 10);
        sell.status = OrderStatus::CancelRequested;

        let applied = apply_match_result(
            &mut mkt,
            &mut buy,
            &mut sell,
            100 * PRICE_SCALE,
            10,
            true,
            true,
        )
        .unwrap();
        assert!(!applied);
        assert_eq!(buy.status, OrderStatus::Open);
        assert_eq!(buy.filled_base, 0);
        assert_eq!(buy.collateral_pending, 0);
        assert_eq!(mkt.active_bids, 1);
        assert_eq!(mkt.active_asks, 1);
    }

    #[test]
    fn zero_price_or_amount_voids_the_match() {
        let (alice, bob) = keypair_pubkeys();
        let mut mkt = market();
        let mut buy = order(alice, 1, Side::Buy, 1_000);
        let mut sell = order(bob, 2, Side::Sell, 10);

        let applied =
            apply_match_result(&mut mkt, &mut buy, &mut sell, 0, 10, true, true).unwrap();
        assert!(!applied);
        let applied =
            apply_match_result(&mut mkt, &mut buy, &mut sell, PRICE_SCALE, 0, true, true)
                .unwrap();
        assert!(!applied);
        assert_eq!(buy.filled_base, 0);
        assert_eq!(sell.filled_base, 0);
    }

    #[test]
    fn book_capacity_is_enforced() {
        let mut mkt = market();
        mkt.active_bids = MAX_BOOK_ORDERS;
        let mut pos = position(Pubkey::new_unique(), 0, 10_000);
        assert_eq!(
            reserve_for_order(&mut mkt, &mut pos, Side::Buy, 1).unwrap_err(),
            DarkbookError::OrderbookFull.into()
        );
    }

    #[test]
    fn per_position_order_cap_is_enforced() {
        let mut mkt = market();
        let mut pos = position(Pubkey::new_unique(), 0, 10_000);
        pos.active_order_count = MAX_ACTIVE_ORDERS;
        assert_eq!(
            reserve_for_order(&mut mkt, &mut pos, Side::Buy, 1).unwrap_err(),
            DarkbookError::TooManyOrders.into()
        );
    }
}
