/// Test fixtures: trimmed council pages.
///
/// Each page keeps the surrounding markup that the provider pattern has to
/// skip over (navigation, other bold text, image tags) but drops everything
/// else. Line breaks are kept where the live pages have them, since some
/// patterns do not cross lines.

/// Watercare page during level two restrictions. The first bold element
/// mentions restrictions without a level.
#[cfg(test)]
pub(crate) fn fixture_watercare_level_two() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<head><title>Water restrictions | Watercare</title></head>
<body>
  <nav><a href="/">Home</a> &gt; <a href="/Water-and-wastewater">Water and wastewater</a></nav>
  <h1>Water restrictions</h1>
  <p><strong>Current water restrictions</strong></p>
  <div class="callout">
    <p><strong>Level Two restrictions are now in place across Auckland</strong></p>
    <p>Outdoor use of hoses and sprinklers is banned.</p>
  </div>
</body>
</html>"#
}

/// Watercare page after restrictions were lifted.
#[cfg(test)]
pub(crate) fn fixture_watercare_no_restrictions() -> &'static str {
    r#"<html>
<body>
  <h1>Water restrictions</h1>
  <p><strong>There are currently no restrictions</strong></p>
</body>
</html>"#
}

/// Napier page with the status box split over several lines.
#[cfg(test)]
pub(crate) fn fixture_napier_level_two() -> &'static str {
    r#"<html>
<body>
  <p><strong>Water conservation tips</strong></p>
  <div class="waterstat">
    <span class="icon"></span>
    <p>
      <strong>Current Status: Level Two restrictions</strong>
    </p>
  </div>
</body>
</html>"#
}

/// Taupo notice in bold text.
#[cfg(test)]
pub(crate) fn fixture_taupo_level_two() -> &'static str {
    r#"<html>
<body>
  <h2>Water conservation</h2>
  <p>From Monday the district moves to <strong>Level Two restrictions</strong>.</p>
</body>
</html>"#
}

/// SmartWater Hamilton page; the stylesheet link also sits under /assets/.
#[cfg(test)]
pub(crate) fn fixture_smartwater_level_three() -> &'static str {
    r#"<html>
<head><link rel="stylesheet" href="/assets/css/site.css"></head>
<body>
  <div class="alert-level">
    <img src="/assets/Uploads/alert-levels/water-alert-3.svg" alt="Alert level 3">
  </div>
  <footer><img src="/assets/images/logo.svg" alt="Smart Water"></footer>
</body>
</html>"#
}

/// Matamata-Piako page; an unrelated heading comes first.
#[cfg(test)]
pub(crate) fn fixture_matamata_piako_level_two() -> &'static str {
    r#"<html>
<body>
  <h5>Latest update</h5>
  <p>Reservoir levels are dropping.</p>
  <h5><strong>Level Two water restrictions</strong>
      are in place for Matamata, Morrinsville and Te Aroha</h5>
</body>
</html>"#
}

/// A page none of the providers can read.
#[cfg(test)]
pub(crate) fn fixture_unrelated_page() -> &'static str {
    r#"<html>
<head><title>Page not found</title></head>
<body><h1>Sorry, we couldn't find that page</h1></body>
</html>"#
}
