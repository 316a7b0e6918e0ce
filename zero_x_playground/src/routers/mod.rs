pub mod zero_x;
