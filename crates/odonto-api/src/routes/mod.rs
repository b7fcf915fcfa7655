pub mod agenda;
pub mod appointments;
pub mod auth;
pub mod billing;
pub mod budgets;
pub mod crud;
pub mod dentists;
pub mod files;
pub mod health;
pub mod installments;
pub mod integrations;
pub mod patients;
pub mod payment_plans;
pub mod procedures;
pub mod reports;
pub mod settings;
