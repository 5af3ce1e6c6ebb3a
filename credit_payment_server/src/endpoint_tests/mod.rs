mod auth;
mod helpers;
mod history;
mod logs;
mod mocks;
mod orders;
mod verify;
