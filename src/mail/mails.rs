use crate::config::Config;
use crate::mail::sendmail::send_email;
use crate::models::viewingmodel::Booking;

pub fn send_booking_confirmation_email(
    config: &Config,
    to_email: &str,
    name: &str,
    booking: &Booking,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = format!("Your viewing is confirmed ({})", booking.reference);

    let html_body = format!(
        r#"<html>
<body>
  <p>Hi {name},</p>
  <p>Your property viewing has been confirmed.</p>
  <ul>
    <li><strong>Reference:</strong> {reference}</li>
    <li><strong>Date:</strong> {date}</li>
    <li><strong>Time:</strong> {time}</li>
    <li><strong>Where:</strong> {location}</li>
  </ul>
  <p>Your viewing fee stays in escrow until the viewing is conducted.</p>
  <p>— The Dapio team</p>
</body>
</html>"#,
        name = name,
        reference = booking.reference,
        date = booking.scheduled_date,
        time = booking.scheduled_time,
        location = booking.location,
    );

    send_email(config, to_email, &subject, &html_body)
}
