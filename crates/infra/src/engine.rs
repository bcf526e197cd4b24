//! Command execution pipeline (application-level orchestration).
//!
//! The engine routes each [`InboundCommand`] to the workflow components and
//! turns domain results into the SMS-facing reply plus any side-band
//! notifications. Routing is a closed match over [`CommandKind`]; the
//! command set is fixed and small, so there is no handler registration.
//!
//! Every mutating command runs inside one store transaction, so the sale or
//! transfer record write and all stock/revenue adjustments commit together
//! or not at all.

use chrono::Utc;
use tracing::{info, warn};

use pikwa_commands::{
    CommandKind, CommandOutcome, InboundCommand, parse_restock_command, parse_sale_command,
};
use pikwa_core::{Alias, DomainError, DomainResult, ProductCode, SerialNumber};
use pikwa_parties::RetailerDirectory;
use pikwa_stock::StockHolder;

use crate::store::{RetailState, RetailStore};

const SALE_FORMAT: &str =
    "Sale format: sale serial# firstname lastname mobile# price regioncode description";
const RESTOCK_USAGE: &str = "Usage: restock (recipient) (code)(amount)\nExample: restock dnombo 5ew";
const NEW_PRODUCT_USAGE: &str = "Usage: new (code)(amount)\nExample: new 100ew";
const NO_PERMISSION: &str = "You do not have permission to use this command.";
const NONE_PENDING: &str = "There were no transfers pending.";

fn unknown_user(alias: &str) -> String {
    format!("Sorry, user {alias} was not found. Please check your spelling and try again")
}

/// The application service behind the messaging collaborator.
#[derive(Debug)]
pub struct RetailEngine {
    store: RetailStore,
}

impl RetailEngine {
    pub fn new(store: RetailStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RetailStore {
        &self.store
    }

    /// Execute one inbound command and produce the reply/notifications.
    ///
    /// Domain failures come back as unsuccessful outcomes with a
    /// user-facing message; only internal store failures are logged as
    /// warnings and masked behind a generic reply.
    pub fn execute(&self, command: &InboundCommand) -> CommandOutcome {
        let result = match command.kind {
            CommandKind::Sale => self.handle_sale(command),
            CommandKind::CancelSale => self.handle_cancel_sale(command),
            CommandKind::Restock => self.handle_restock(command),
            CommandKind::Accept => self.handle_resolution(command, Resolution::Accept),
            CommandKind::Reject => self.handle_resolution(command, Resolution::Reject),
            CommandKind::CancelRestock => self.handle_cancel_restock(command),
            CommandKind::NewProduct => self.handle_new_product(command),
            CommandKind::GrantManager => self.handle_grant_manager(command),
            CommandKind::CheckStock => self.handle_check_stock(command),
            CommandKind::CheckStatus => self.handle_check_status(command),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(DomainError::Internal(msg)) => {
                warn!(kind = ?command.kind, actor = %command.actor, error = %msg, "command aborted");
                CommandOutcome::error("System error. Please try again later.")
            }
            Err(err) => CommandOutcome::error(format!("ERROR: {err}")),
        };

        info!(
            kind = ?command.kind,
            actor = %command.actor,
            success = outcome.success,
            notifications = outcome.notifications.len(),
            "command executed"
        );
        outcome
    }

    fn handle_sale(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        self.store.transaction(|state| {
            let request = match parse_sale_command(
                &command.raw_text,
                &state.catalog,
                &command.actor,
                Utc::now(),
            ) {
                Ok(request) => request,
                Err(DomainError::Validation(problems)) => {
                    return Ok(CommandOutcome::error(format!(
                        "ERROR: {}. {SALE_FORMAT}",
                        problems.join(", ")
                    )));
                }
                Err(err) => return Err(err),
            };

            match state
                .sales
                .record_sale(&mut state.stock, &mut state.retailers, request)
            {
                Ok(sale) => Ok(CommandOutcome::ok(format!(
                    "{} registered to {} by {}. Cash sale.",
                    sale.serial(),
                    sale.buyer().full_name(),
                    command.actor
                ))),
                Err(DomainError::OutOfStock(code)) => {
                    Ok(CommandOutcome::error(format!("ERROR: No {code} in stock.")))
                }
                Err(DomainError::DuplicateSerial(serial)) => Ok(CommandOutcome::error(format!(
                    "ERROR: {serial} is already registered."
                ))),
                Err(err) => Err(err),
            }
        })
    }

    fn handle_cancel_sale(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        let Some(serial_token) = first_token(&command.raw_text) else {
            return Ok(CommandOutcome::error("To cancel a sale use cancel serial#"));
        };
        let Ok(serial) = SerialNumber::new(&serial_token) else {
            return Ok(CommandOutcome::error(format!(
                "ERROR: No sale record found for {}",
                serial_token.to_uppercase()
            )));
        };

        self.store.transaction(|state| {
            match state.sales.cancel_sale(
                &mut state.stock,
                &mut state.retailers,
                &serial,
                &command.actor,
            ) {
                Ok(sale) => Ok(CommandOutcome::ok(format!(
                    "Sale {} to {} canceled. Stock for {}: {}",
                    sale.serial(),
                    sale.buyer().full_name(),
                    command.actor,
                    format_stock(state, &command.actor)
                ))),
                Err(DomainError::NotFound(_)) => Ok(CommandOutcome::error(format!(
                    "ERROR: No sale record found for {serial}"
                ))),
                Err(DomainError::NotAuthorized) => Ok(CommandOutcome::error(
                    "ERROR: You are not allowed to cancel this sale",
                )),
                Err(err) => Err(err),
            }
        })
    }

    fn handle_restock(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        let Some((recipient_token, rest)) = split_first_token(&command.raw_text) else {
            return Ok(CommandOutcome::error(RESTOCK_USAGE));
        };
        let Ok(recipient) = Alias::new(&recipient_token) else {
            return Ok(CommandOutcome::error(unknown_user(&recipient_token)));
        };

        self.store.transaction(|state| {
            if state.retailers.resolve_by_alias(&recipient).is_err() {
                return Ok(CommandOutcome::error(unknown_user(recipient.as_str())));
            }

            let parsed = match parse_restock_command(&rest, &state.catalog) {
                Ok(parsed) => parsed,
                Err(DomainError::MalformedCommand(_)) => {
                    return Ok(CommandOutcome::error(format!(
                        "Missing product code or amount. Restock messages cannot contain spaces.\n{RESTOCK_USAGE}"
                    )));
                }
                Err(err) => return Err(err),
            };

            let outcome = state.transfers.initiate(
                &mut state.stock,
                &command.actor,
                &recipient,
                &parsed.requests,
                Utc::now(),
            );

            let mut response = String::new();
            let mut notification = String::new();
            if !outcome.sent.is_empty() {
                for line in &outcome.sent {
                    let part = format!(
                        "{} {} ",
                        line.quantity,
                        display_name(state, &line.code)
                    );
                    response.push_str(&part);
                    notification.push_str(&part);
                }
                response.push_str(&format!("sent to {recipient}. "));
            }
            if !outcome.stockouts.is_empty() {
                for code in &outcome.stockouts {
                    response.push_str(&format!("{code} "));
                }
                response.push_str("out of stock. ");
            }
            if !parsed.unrecognized.is_empty() {
                for code in &parsed.unrecognized {
                    response.push_str(&format!("{code} "));
                }
                response.push_str("not recognized.");
            }

            let mut reply = CommandOutcome::ok(response.trim_end().to_string());
            if !notification.is_empty() {
                notification.push_str(&format!(
                    "being sent by {}. Reply 'yes' to accept, 'no' to reject.",
                    command.actor
                ));
                reply = reply.with_notification(recipient.clone(), notification);
            }
            Ok(reply)
        })
    }

    fn handle_resolution(
        &self,
        command: &InboundCommand,
        resolution: Resolution,
    ) -> DomainResult<CommandOutcome> {
        self.store.transaction(|state| {
            let pending = state.transfers.pending_for_recipient(&command.actor);
            if pending.is_empty() {
                return Ok(CommandOutcome::ok(NONE_PENDING));
            }
            // All-or-nothing over the batch: a short escrow balance aborts
            // before the first transfer commits.
            state.transfers.escrow_covers(&state.stock, &pending)?;

            let mut parts = Vec::new();
            let mut outcome = CommandOutcome::ok(String::new());
            let now = Utc::now();

            for id in pending {
                let transfer = match resolution {
                    Resolution::Accept => {
                        state.transfers.accept(&mut state.stock, id, &command.actor, now)?
                    }
                    Resolution::Reject => {
                        state.transfers.reject(&mut state.stock, id, &command.actor, now)?
                    }
                };
                let initiator = transfer.initiator().clone();

                match resolution {
                    Resolution::Accept => {
                        parts.push(format!(
                            "Transfer from {initiator} done, current stock {}.",
                            format_stock(state, &command.actor)
                        ));
                        outcome = outcome.with_notification(
                            initiator.clone(),
                            format!(
                                "Transfer confirmed by {}. Current stock {}.",
                                command.actor,
                                format_stock(state, &initiator)
                            ),
                        );
                    }
                    Resolution::Reject => {
                        parts.push(format!(
                            "Transfer from {initiator} rejected, current stock {}.",
                            format_stock(state, &command.actor)
                        ));
                        outcome = outcome.with_notification(
                            initiator.clone(),
                            format!(
                                "Transfer rejected by {}. Current stock {}.",
                                command.actor,
                                format_stock(state, &initiator)
                            ),
                        );
                    }
                }
            }

            outcome.message = parts.join(" ");
            Ok(outcome)
        })
    }

    fn handle_cancel_restock(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        self.store.transaction(|state| {
            let cancelled =
                state
                    .transfers
                    .cancel_all(&mut state.stock, &command.actor, Utc::now())?;
            if cancelled.is_empty() {
                return Ok(CommandOutcome::ok(NONE_PENDING));
            }
            Ok(CommandOutcome::ok(format!(
                "Canceled {} pending transfer(s). Current stock: {}",
                cancelled.len(),
                format_stock(state, &command.actor)
            )))
        })
    }

    fn handle_new_product(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        self.store.transaction(|state| {
            // Permission check precedes parsing; unregistered or non-manager
            // users get the same unhelpful reply.
            let allowed = state
                .retailers
                .resolve_by_alias(&command.actor)
                .map(|r| r.is_manager())
                .unwrap_or(false);
            if !allowed {
                return Ok(CommandOutcome::error(NO_PERMISSION));
            }

            let parsed = match parse_restock_command(&command.raw_text, &state.catalog) {
                Ok(parsed) => parsed,
                Err(DomainError::MalformedCommand(_)) => {
                    return Ok(CommandOutcome::error(NEW_PRODUCT_USAGE));
                }
                Err(err) => return Err(err),
            };

            let holder = StockHolder::retailer(command.actor.clone());
            let mut response = String::new();
            for (code, amount) in &parsed.requests {
                state.stock.grant(&holder, code, *amount);
                if !response.is_empty() {
                    response.push_str(", ");
                }
                response.push_str(&format!("{amount} {}", display_name(state, code)));
            }
            if !response.is_empty() {
                response.push_str(" added. ");
            }
            if !parsed.unrecognized.is_empty() {
                for code in &parsed.unrecognized {
                    response.push_str(&format!("{code} "));
                }
                response.push_str("not recognized. ");
            }
            response.push_str(&format!(
                "Current stock: {}",
                format_stock(state, &command.actor)
            ));
            Ok(CommandOutcome::ok(response))
        })
    }

    fn handle_grant_manager(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        let Some(target_token) = first_token(&command.raw_text) else {
            return Ok(CommandOutcome::error("Usage: m (username). Example: m dnombo"));
        };

        self.store.transaction(|state| {
            let allowed = state
                .retailers
                .resolve_by_alias(&command.actor)
                .map(|r| r.is_manager())
                .unwrap_or(false);
            if !allowed {
                return Ok(CommandOutcome::error(NO_PERMISSION));
            }

            let Ok(target) = Alias::new(&target_token) else {
                return Ok(CommandOutcome::error(unknown_user(&target_token)));
            };
            let Ok(retailer) = state.retailers.resolve_by_alias_mut(&target) else {
                return Ok(CommandOutcome::error(unknown_user(target.as_str())));
            };
            retailer.promote_to_manager();

            Ok(
                CommandOutcome::ok(format!("{target} has been made a manager."))
                    .with_notification(
                        target.clone(),
                        format!("You have been made a manager by {}.", command.actor),
                    ),
            )
        })
    }

    fn handle_check_stock(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        let subject = match first_token(&command.raw_text) {
            Some(token) => match Alias::new(&token) {
                Ok(alias) => alias,
                Err(_) => return Ok(CommandOutcome::error(unknown_user(&token))),
            },
            None => command.actor.clone(),
        };

        self.store.read(|state| {
            if state.retailers.resolve_by_alias(&subject).is_err() {
                return CommandOutcome::error(unknown_user(subject.as_str()));
            }
            CommandOutcome::ok(format!(
                "Stock for {subject}: {}",
                format_stock(state, &subject)
            ))
        })
    }

    fn handle_check_status(&self, command: &InboundCommand) -> DomainResult<CommandOutcome> {
        let Some(token) = first_token(&command.raw_text) else {
            return Ok(CommandOutcome::error(
                "Usage: c (serial number)\nExample: c EC12345",
            ));
        };
        let serial = match SerialNumber::new(&token) {
            Ok(serial) => serial,
            Err(_) => {
                return Ok(CommandOutcome::error(format!(
                    "Serial number {} not recognized",
                    token.to_uppercase()
                )));
            }
        };

        self.store.read(|state| match state.sales.by_serial(&serial) {
            Some(sale) => CommandOutcome::ok(sale.status_line()),
            None => CommandOutcome::error(format!("Serial number {serial} not recognized")),
        })
    }
}

#[derive(Debug, Copy, Clone)]
enum Resolution {
    Accept,
    Reject,
}

fn first_token(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_string)
}

fn split_first_token(text: &str) -> Option<(String, String)> {
    let mut parts = text.split_whitespace();
    let first = parts.next()?.to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    Some((first, rest))
}

/// `"4 EW stove, 2 CW stove"`, or `"not found."` for an empty holding.
fn format_stock(state: &RetailState, alias: &Alias) -> String {
    let lines = state.stock.summary(&StockHolder::retailer(alias.clone()));
    if lines.is_empty() {
        return "not found.".to_string();
    }
    lines
        .iter()
        .map(|line| format!("{} {}", line.quantity, display_name(state, &line.code)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_name(state: &RetailState, code: &ProductCode) -> String {
    state
        .catalog
        .lookup_by_code(code)
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|_| code.as_str().to_string())
}
