pub mod allocate;
pub mod allocate_for_user;
pub mod approve_shares;
pub mod crystallize_fees;
pub mod deposit;
pub mod initialize_strategy;
pub mod initialize_vault;
pub mod manage_strategy;
pub mod register_strategy;
pub mod router_position;
pub mod shared;
pub mod strategy_admin;
pub mod transfer_shares;
pub mod update_config;
pub mod views;
pub mod withdraw;

pub use allocate::*;
pub use allocate_for_user::*;
pub use approve_shares::*;
pub use crystallize_fees::*;
pub use deposit::*;
pub use initialize_strategy::*;
pub use initialize_vault::*;
pub use manage_strategy::*;
pub use register_strategy::*;
pub use router_position::*;
pub use strategy_admin::*;
pub use transfer_shares::*;
pub use update_config::*;
pub use views::*;
pub use withdraw::*;
