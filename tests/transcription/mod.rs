mod alignment;
mod guess;
mod jacobian;
