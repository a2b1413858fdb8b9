//! Built-in Tera templates, one per output format and grouping mode.
//!
//! Every template receives `version`, `close_date`, `repo_full_name`,
//! `repo_owner`, `repo_name`, `issues`, `pull_requests` and
//! `issue_label_groups` (a list of `{ name, issues }`).

/// Changelog with a flat list of issues.
pub const CHANGELOG_TEMPLATE: &str = r#"## Version {{ version }} ({{ close_date }})
{% if issues %}
### Issues Closed
{% for issue in issues %}
* [Issue {{ issue.number }}]({{ issue.html_url }}) - {{ issue.title }}{% if issue.labels %} ({{ issue.labels | join(sep=", ") }}){% endif %}
{%- endfor %}

In this release {{ issues | length }} issue{% if issues | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}{% if pull_requests %}
### Pull Requests Merged
{% for pr in pull_requests %}
* [PR {{ pr.number }}]({{ pr.html_url }}) - {{ pr.title }}, by [@{{ pr.author }}](https://github.com/{{ pr.author }})
{%- endfor %}

In this release {{ pull_requests | length }} pull request{% if pull_requests | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}"#;

/// Changelog with issues split into label groups.
pub const CHANGELOG_GROUPS_TEMPLATE: &str = r#"## Version {{ version }} ({{ close_date }})
{% if issue_label_groups %}
### Issues Closed
{% for group in issue_label_groups %}
#### {{ group.name }}
{% for issue in group.issues %}
* [Issue {{ issue.number }}]({{ issue.html_url }}) - {{ issue.title }}
{%- endfor %}
{% endfor %}
In this release {{ issues | length }} issue{% if issues | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}{% if pull_requests %}
### Pull Requests Merged
{% for pr in pull_requests %}
* [PR {{ pr.number }}]({{ pr.html_url }}) - {{ pr.title }}, by [@{{ pr.author }}](https://github.com/{{ pr.author }})
{%- endfor %}

In this release {{ pull_requests | length }} pull request{% if pull_requests | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}"#;

/// Release notes with a flat list of issues, using `owner/repo#N`
/// references that GitHub links automatically.
pub const RELEASE_TEMPLATE: &str = r#"## Version {{ version }} ({{ close_date }})
{% if issues %}
### Issues Closed
{% for issue in issues %}
* {{ repo_full_name }}#{{ issue.number }} - {{ issue.title }}
{%- endfor %}

In this release {{ issues | length }} issue{% if issues | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}{% if pull_requests %}
### Pull Requests Merged
{% for pr in pull_requests %}
* {{ repo_full_name }}#{{ pr.number }} - {{ pr.title }}, by @{{ pr.author }}
{%- endfor %}

In this release {{ pull_requests | length }} pull request{% if pull_requests | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}"#;

/// Release notes with issues split into label groups.
pub const RELEASE_GROUPS_TEMPLATE: &str = r#"## Version {{ version }} ({{ close_date }})
{% if issue_label_groups %}
### Issues Closed
{% for group in issue_label_groups %}
#### {{ group.name }}
{% for issue in group.issues %}
* {{ repo_full_name }}#{{ issue.number }} - {{ issue.title }}
{%- endfor %}
{% endfor %}
In this release {{ issues | length }} issue{% if issues | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}{% if pull_requests %}
### Pull Requests Merged
{% for pr in pull_requests %}
* {{ repo_full_name }}#{{ pr.number }} - {{ pr.title }}, by @{{ pr.author }}
{%- endfor %}

In this release {{ pull_requests | length }} pull request{% if pull_requests | length == 1 %} was{% else %}s were{% endif %} closed.
{% endif %}"#;
