//! Prompt builders for each roast and battle flavour

use crate::data::{GithubUserData, LeetcodeProfile};

const DELIVERY_RULES: &str = "Your response should be direct as if you're talking to them. \
Don't include any meta-text or labels. Ignore any links in the data. \
Keep your response medium length - not too short, not too long. Include emojis. \
Your entire response will be passed directly to a frontend, so only include the final text.";

fn github_section(label: &str, user: &GithubUserData) -> String {
    let repos = if user.top_repos.is_empty() {
        "None".to_string()
    } else {
        user.top_repos
            .iter()
            .map(|repo| {
                format!(
                    "{} ({} stars, {} forks, Main language: {})",
                    repo.name,
                    repo.stars,
                    repo.forks,
                    repo.language.as_deref().unwrap_or("Not specified")
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{label}: {} ({})\n\
         - Bio: {}\n\
         - Followers: {}\n\
         - Following: {}\n\
         - Public Repos: {}\n\
         - Company: {}\n\
         - Location: {}\n\
         - GitHub member since: {}\n\
         - Top Repositories: {repos}\n",
        user.name,
        user.username,
        user.bio,
        user.followers,
        user.following,
        user.public_repos,
        user.company,
        user.location,
        user.created_at.format("%b %-d, %Y"),
    )
}

/// Prompt for roasting a single GitHub user
pub fn github_roast(user: &GithubUserData) -> String {
    format!(
        "You need to behave as a professional roaster reviewing a GitHub user.\n\n\
         {}\n\
         Roast this GitHub profile mercilessly. Be creative, harsh, sarcastic and funny. \
         Point out weaknesses in their stats and repository quality.\n\n{DELIVERY_RULES}",
        github_section("Developer", user)
    )
}

/// Prompt used when the GitHub user does not exist
pub fn github_not_found(username: &str) -> String {
    format!(
        "We tried to fetch GitHub data for user \"{username}\" but they do not exist on GitHub (404 error). \
         Roast us (the backend team) for failing to find the user, and let the requester know the user \
         does not exist, so you can't roast them. Be funny, self-deprecating, and include emojis."
    )
}

/// Prompt for comparing two GitHub users
pub fn github_battle(first: &GithubUserData, second: &GithubUserData) -> String {
    format!(
        "You need to behave as an evaluator comparing two GitHub users.\n\n\
         {}\n{}\n\
         Evaluate both profiles. Roast the weaker profile harshly and praise the stronger one \
         enthusiastically. If both are roughly equal, praise both.\n\n{DELIVERY_RULES}",
        github_section("Developer 1", first),
        github_section("Developer 2", second)
    )
}

fn leetcode_section(label: &str, user: &LeetcodeProfile) -> String {
    let mut section = format!(
        "{label}: {} ({})\n\
         - Total Solved Problems: {}\n\
         - Easy / Medium / Hard: {} / {} / {}\n\
         - Acceptance Rate: {}\n\
         - Star Rating: {}\n\
         - Global Ranking: {}\n",
        user.name,
        user.username,
        user.total_solved,
        user.easy_solved,
        user.medium_solved,
        user.hard_solved,
        user.acceptance_rate
            .as_deref()
            .map_or_else(|| "N/A".to_string(), |rate| format!("{rate}%")),
        user.rating,
        user.ranking
            .map_or_else(|| "Not ranked".to_string(), |rank| format!("#{rank}")),
    );

    let badges = if user.badges.is_empty() {
        "None".to_string()
    } else {
        user.badges.iter().map(|b| b.label()).collect::<Vec<_>>().join(", ")
    };
    let languages = if user.languages.is_empty() {
        "No language data".to_string()
    } else {
        user.languages
            .iter()
            .map(|l| format!("{}: {} problems", l.language_name, l.problems_solved))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let contest = match &user.contest_badge {
        Some(badge) if badge.expired => format!("{} (EXPIRED!)", badge.name),
        Some(badge) => badge.name.clone(),
        None => "No contest achievements".to_string(),
    };

    section.push_str(&format!(
        "- Company: {}\n\
         - Country: {}\n\
         - Badges: {badges}\n\
         - Languages: {languages}\n\
         - Contest Badge: {contest}\n",
        user.company.as_deref().unwrap_or("Not specified"),
        user.country.as_deref().unwrap_or("Unknown"),
    ));
    section
}

/// Prompt for roasting a single LeetCode user
pub fn leetcode_roast(user: &LeetcodeProfile) -> String {
    format!(
        "You need to behave as a professional roaster reviewing a LeetCode user.\n\n\
         {}\n\
         Roast this LeetCode profile mercilessly. Mock them for avoiding hard problems, a low \
         acceptance rate, a missing contest rating or an embarrassing lack of badges, whichever applies.\n\n\
         {DELIVERY_RULES}",
        leetcode_section("LeetCode User", user)
    )
}

/// Prompt used when the LeetCode user does not exist
pub fn leetcode_not_found(username: &str) -> String {
    format!(
        "We tried to fetch LeetCode data for user \"{username}\" but they do not exist on LeetCode. \
         Roast us (the backend team) for failing to find the user, and let the requester know the user \
         does not exist, so you can't roast them. Be funny, self-deprecating, and include emojis."
    )
}

/// Prompt used when LeetCode could not be reached for one or more users
pub fn leetcode_api_error(usernames: &[&str]) -> String {
    format!(
        "We tried to fetch LeetCode data for user(s) \"{}\" but our backend failed to get the data \
         due to an error on our side (external API failure). Roast us (the backend team) for failing, \
         and let the requester know it's our fault, not theirs. Be funny, self-deprecating, and include emojis.",
        usernames.join(" and ")
    )
}

/// Prompt for comparing two LeetCode users
pub fn leetcode_battle(first: &LeetcodeProfile, second: &LeetcodeProfile) -> String {
    format!(
        "You need to behave as an evaluator comparing two LeetCode users.\n\n\
         {}\n{}\n\
         Compare overall problems solved, difficulty balance, contest performance and acceptance rate. \
         Roast the weaker profile harshly and praise the stronger one. If both are roughly equal, \
         praise both.\n\n{DELIVERY_RULES}",
        leetcode_section("User 1", first),
        leetcode_section("User 2", second)
    )
}
