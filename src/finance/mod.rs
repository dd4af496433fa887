//! Finance records managed by the client and their read filters.

mod entity;
pub mod filters;
pub mod types;

pub use filters::{
  BankAccountFilter, CategoryFilter, DateRange, ImportFilter, NetWorthFilter, Page, SortOrder,
  SubscriptionFilter, TransactionFilter,
};
pub use types::{
  AccountType, BankAccount, BillingInterval, Category, CategoryType, DashboardLayout, Import,
  ImportStatus, NetWorthSnapshot, Subscription, Transaction, TransactionType, WidgetPlacement,
};
