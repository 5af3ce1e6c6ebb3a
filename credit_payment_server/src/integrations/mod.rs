pub mod email;
pub mod razorpay;
