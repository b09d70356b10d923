mod contact;
mod health_check;
mod helpers;
mod home;
