pub mod mpay;
