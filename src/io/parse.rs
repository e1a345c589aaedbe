use serde::Deserialize;

use super::error::IoError;
use crate::domain::{AccountId, AmountType, TransactionId, UserId};

/// Raw CSV record as read from the command input
#[derive(Debug, Deserialize)]
pub struct RawCommandRecord {
    pub op: String,
    pub account: Option<AccountId>,
    pub user: Option<UserId>,
    pub to: Option<AccountId>,
    pub tx: Option<TransactionId>,
    pub amount: Option<String>,
}

/// Strongly-typed replay command.
///
/// `Open` feeds the external account-provisioning surface and `ApproveLoan`
/// the external approval step; everything else maps to one engine
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<A: AmountType> {
    Open {
        account_id: AccountId,
        user_id: UserId,
        balance: A,
    },
    Deposit {
        account_id: AccountId,
        amount: A,
    },
    Withdraw {
        account_id: AccountId,
        amount: A,
    },
    RequestLoan {
        account_id: AccountId,
        amount: A,
    },
    ApproveLoan {
        transaction_id: TransactionId,
    },
    PayLoan {
        transaction_id: TransactionId,
    },
    Transfer {
        sender_id: AccountId,
        recipient_id: AccountId,
        amount: A,
    },
}

impl RawCommandRecord {
    /// Parse this raw record into a strongly-typed Command
    pub fn parse<A: AmountType>(self) -> Result<Command<A>, IoError> {
        let op = self.op.trim().to_lowercase();

        match op.as_str() {
            "open" => Ok(Command::Open {
                account_id: require(self.account, "account")?,
                user_id: require(self.user, "user")?,
                balance: match self.amount {
                    Some(raw) => parse_amount(raw)?,
                    None => A::zero(),
                },
            }),
            "deposit" => Ok(Command::Deposit {
                account_id: require(self.account, "account")?,
                amount: parse_amount(require(self.amount, "amount")?)?,
            }),
            "withdraw" => Ok(Command::Withdraw {
                account_id: require(self.account, "account")?,
                amount: parse_amount(require(self.amount, "amount")?)?,
            }),
            "loan" => Ok(Command::RequestLoan {
                account_id: require(self.account, "account")?,
                amount: parse_amount(require(self.amount, "amount")?)?,
            }),
            "approve" => Ok(Command::ApproveLoan {
                transaction_id: require(self.tx, "tx")?,
            }),
            "payloan" => Ok(Command::PayLoan {
                transaction_id: require(self.tx, "tx")?,
            }),
            "transfer" => Ok(Command::Transfer {
                sender_id: require(self.account, "account")?,
                recipient_id: require(self.to, "to")?,
                amount: parse_amount(require(self.amount, "amount")?)?,
            }),
            _ => Err(IoError::UnknownCommand(self.op)),
        }
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, IoError> {
    value.ok_or_else(|| IoError::MissingField(field.to_string()))
}

fn parse_amount<A: AmountType>(raw: String) -> Result<A, IoError> {
    A::from_decimal_str(&raw).map_err(|_| IoError::InvalidAmount(raw))
}
