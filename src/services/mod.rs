pub mod forecasting;
