pub mod buy_vs_rent;
pub mod decision;
pub mod stages;
