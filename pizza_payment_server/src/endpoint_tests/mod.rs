mod callbacks;
mod health;
mod mocks;
mod orders;
mod poll;
mod products;
